//! Celestial body data records.
//!
//! Bodies are constructed once at scene init and stay immutable afterwards,
//! except for the texture handle which is resolved against the asset
//! collaborator during `Orrery::init`. Special-case geometry (moons, rings)
//! lives in a per-body attachment list instead of hard-coded body indices,
//! so the composer iterates attachments uniformly.

use glam::Vec3;

use crate::core::orbit;
use crate::renderer::traits::TextureId;

/// A moon attached to a parent body. Circular orbit in the parent's plane,
/// counter-rotating relative to the parent's orbital direction.
#[derive(Debug, Clone, Copy)]
pub struct Moon {
    /// Orbit radius around the parent's center.
    pub distance: f32,
    /// Orbit period in simulation seconds.
    pub orbit_period: f32,
    /// Self-rotation period in simulation seconds.
    pub spin_period: f32,
    /// Visual radius.
    pub radius: f32,
}

impl Moon {
    /// World-space position at simulation time `t`, given the parent's
    /// position and orbital period (whose sign sets the moon's direction).
    pub fn position(&self, parent_pos: Vec3, parent_orbit_period: f32, t: f32) -> Vec3 {
        let angle = orbit::moon_angle(parent_orbit_period, self.orbit_period, t);
        orbit::moon_position(parent_pos, self.distance, angle)
    }

    /// Self-rotation angle in degrees at simulation time `t`.
    pub fn spin_deg(&self, parent_orbit_period: f32, t: f32) -> f32 {
        orbit::moon_spin_deg(parent_orbit_period, self.spin_period, t)
    }
}

/// A flat ring around a body (Saturn-style annulus).
#[derive(Debug, Clone, Copy)]
pub struct Ring {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Tilt about the Z axis, degrees.
    pub tilt_deg: f32,
}

/// Geometry attached to a body, drawn immediately after the body itself.
#[derive(Debug, Clone, Copy)]
pub enum Attachment {
    Moon(Moon),
    Ring(Ring),
}

/// Additive-blended atmosphere shell drawn over a body's sphere.
#[derive(Debug, Clone, Copy)]
pub struct Atmosphere {
    pub color: Vec3,
    pub intensity: f32,
}

/// One body of the scene. Index 0 is always the sun.
#[derive(Debug, Clone)]
pub struct CelestialBody {
    pub name: &'static str,
    /// Visual sphere radius.
    pub radius: f32,
    /// Orbit radius around the sun. 0 for the sun itself.
    pub distance: f32,
    /// Orbit period in simulation seconds. Sign encodes direction;
    /// 0 means the body does not orbit.
    pub orbit_period: f32,
    /// Self-rotation period in simulation seconds. 0 means no spin.
    pub rotation_period: f32,
    /// Base tint, used when the texture is a flat placeholder.
    pub color: Vec3,
    pub atmosphere: Option<Atmosphere>,
    pub attachments: Vec<Attachment>,
    /// Resolved at init; stays the invalid sentinel if loading failed
    /// and no fallback could be produced.
    pub texture: TextureId,
}

impl CelestialBody {
    pub fn new(
        name: &'static str,
        radius: f32,
        distance: f32,
        orbit_period: f32,
        rotation_period: f32,
        color: Vec3,
    ) -> Self {
        Self {
            name,
            radius,
            distance,
            orbit_period,
            rotation_period,
            color,
            atmosphere: None,
            attachments: Vec::new(),
            texture: TextureId::INVALID,
        }
    }

    // -- Builder pattern --

    pub fn with_atmosphere(mut self, color: Vec3, intensity: f32) -> Self {
        self.atmosphere = Some(Atmosphere { color, intensity });
        self
    }

    pub fn with_moon(mut self, moon: Moon) -> Self {
        self.attachments.push(Attachment::Moon(moon));
        self
    }

    pub fn with_ring(mut self, ring: Ring) -> Self {
        self.attachments.push(Attachment::Ring(ring));
        self
    }

    /// World-space position at simulation time `t`.
    /// The sun (distance 0, period 0) rests at the origin.
    pub fn position(&self, t: f32) -> Vec3 {
        if self.distance == 0.0 {
            return Vec3::ZERO;
        }
        orbit::orbit_position(self.distance, self.orbit_period, t)
    }

    pub fn moons(&self) -> impl Iterator<Item = &Moon> {
        self.attachments.iter().filter_map(|a| match a {
            Attachment::Moon(m) => Some(m),
            Attachment::Ring(_) => None,
        })
    }

    pub fn ring(&self) -> Option<&Ring> {
        self.attachments.iter().find_map(|a| match a {
            Attachment::Ring(r) => Some(r),
            Attachment::Moon(_) => None,
        })
    }
}

/// The nine-body reference scene.
///
/// Periods are tuned for watchability, not realism; Venus orbits retrograde
/// on purpose. Earth carries the single large moon, Jupiter its four
/// Galilean-style moons, Saturn the ring.
pub fn solar_system() -> Vec<CelestialBody> {
    vec![
        CelestialBody::new("Sun", 6.0, 0.0, 0.0, 25.0, Vec3::new(1.0, 0.9, 0.6)),
        CelestialBody::new("Mercury", 0.6, 10.0, 10.0, 10.0, Vec3::splat(0.6)),
        CelestialBody::new("Venus", 1.0, 15.0, 18.0, -20.0, Vec3::new(1.0, 0.8, 0.6))
            .with_atmosphere(Vec3::new(0.95, 0.85, 0.6), 0.25),
        CelestialBody::new("Earth", 1.1, 20.0, 20.0, 1.0, Vec3::new(0.4, 0.6, 1.0))
            .with_atmosphere(Vec3::new(0.5, 0.7, 1.0), 0.35)
            .with_moon(Moon {
                distance: 2.8,
                orbit_period: 3.0,
                spin_period: 27.3,
                radius: 0.35,
            }),
        CelestialBody::new("Mars", 0.8, 26.0, 30.0, 1.03, Vec3::new(1.0, 0.5, 0.4)),
        CelestialBody::new("Jupiter", 2.4, 36.0, 60.0, 0.4, Vec3::new(1.0, 0.9, 0.7))
            .with_moon(Moon { distance: 3.0, orbit_period: 2.0, spin_period: 36.0, radius: 0.3 })
            .with_moon(Moon { distance: 4.0, orbit_period: 4.0, spin_period: 36.0, radius: 0.25 })
            .with_moon(Moon { distance: 5.0, orbit_period: 8.0, spin_period: 36.0, radius: 0.4 })
            .with_moon(Moon { distance: 6.0, orbit_period: 16.0, spin_period: 36.0, radius: 0.35 }),
        CelestialBody::new("Saturn", 2.0, 48.0, 80.0, 0.45, Vec3::new(1.0, 0.9, 0.8))
            .with_ring(Ring {
                inner_radius: 2.5,
                outer_radius: 4.0,
                tilt_deg: 27.0,
            }),
        CelestialBody::new("Uranus", 1.6, 60.0, 100.0, 0.72, Vec3::new(0.6, 0.9, 1.0)),
        CelestialBody::new("Neptune", 1.6, 72.0, 130.0, 0.67, Vec3::new(0.4, 0.6, 1.0)),
    ]
}
