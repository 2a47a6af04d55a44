//! Circular orbital motion — pure math, no engine dependencies.
//!
//! Every position is a pure function of simulation time and static orbital
//! parameters, so the renderer, the focused camera, and the lens flare all
//! agree on a body's location within a frame, and tests can replay any
//! instant deterministically.

use glam::Vec3;
use std::f32::consts::TAU;

/// Direction sign of an orbital period. Zero counts as positive.
pub fn orbit_sign(orbit_period: f32) -> f32 {
    if orbit_period >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Position on a circular orbit of the given radius at time `t`.
///
/// A zero period is a valid "no motion" sentinel: the body rests at its
/// `(distance, 0, 0)` offset instead of dividing by zero. A negative period
/// flips the direction of travel (retrograde).
pub fn orbit_position(distance: f32, orbit_period: f32, t: f32) -> Vec3 {
    if orbit_period == 0.0 {
        return Vec3::new(distance, 0.0, 0.0);
    }
    let angle = TAU * t / orbit_period;
    Vec3::new(distance * angle.cos(), 0.0, distance * angle.sin())
}

/// Self-rotation angle in degrees about the vertical axis.
///
/// The spin direction follows the sign of the body's own orbital period;
/// a zero rotation period means no spin.
pub fn rotation_angle_deg(orbit_period: f32, rotation_period: f32, t: f32) -> f32 {
    if rotation_period == 0.0 {
        return 0.0;
    }
    orbit_sign(orbit_period) * (t / rotation_period.abs()) * 360.0
}

/// The sun's self-rotation angle in degrees.
///
/// The sun has no orbit of its own, so its spin sign is defined as the
/// negation of the first planet's orbital sign. This is a deliberate
/// stylistic convention of the reference scene, not physics.
pub fn sun_rotation_angle_deg(first_planet_orbit_period: f32, rotation_period: f32, t: f32) -> f32 {
    if rotation_period == 0.0 {
        return 0.0;
    }
    -orbit_sign(first_planet_orbit_period) * (t / rotation_period.abs()) * 360.0
}

/// Orbit angle of a moon around its parent at time `t`.
///
/// Moons orbit with the parent's orbital sign negated, so they visually
/// counter-rotate relative to the parent's direction of travel. A zero moon
/// period parks the moon at angle 0.
pub fn moon_angle(parent_orbit_period: f32, moon_period: f32, t: f32) -> f32 {
    if moon_period == 0.0 {
        return 0.0;
    }
    -orbit_sign(parent_orbit_period) * TAU * t / moon_period
}

/// World-space moon position from its parent's position and orbit angle.
pub fn moon_position(parent_pos: Vec3, distance: f32, angle: f32) -> Vec3 {
    Vec3::new(
        parent_pos.x + distance * angle.cos(),
        parent_pos.y,
        parent_pos.z + distance * angle.sin(),
    )
}

/// Moon self-rotation in degrees, counter-rotating like its orbit.
pub fn moon_spin_deg(parent_orbit_period: f32, spin_period: f32, t: f32) -> f32 {
    if spin_period == 0.0 {
        return 0.0;
    }
    -orbit_sign(parent_orbit_period) * (t / spin_period.abs()) * 360.0
}
