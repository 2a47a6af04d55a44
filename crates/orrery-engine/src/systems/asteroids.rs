//! Asteroid belt between Mars and Jupiter.
//!
//! Every per-particle parameter is fixed at creation from a seeded RNG and
//! the per-frame transform is a pure function of simulation time, so the
//! belt replays deterministically: same seed + same clock = same frame.

use glam::{Mat4, Vec3};
use std::f32::consts::TAU;

use crate::assets::textures::{self, AssetDecoder};
use crate::renderer::traits::{MeshId, ProgramId, RenderBackend, TextureId};
use crate::systems::rng::Rng;

/// Shared orbit period of the whole belt, simulation seconds.
pub const BELT_ORBIT_PERIOD: f32 = 70.0;

pub const DEFAULT_ASTEROID_COUNT: usize = 120;

const DISTANCE_MIN: f32 = 30.0;
const DISTANCE_MAX: f32 = 33.0;
const RADIUS_MIN: f32 = 0.04;
const RADIUS_MAX: f32 = 0.19;
const INCLINATION_MAX: f32 = 0.05;
const SPIN_MIN_DEG: f32 = 15.0;
const SPIN_MAX_DEG: f32 = 45.0;

/// One belt rock. All fields static after creation.
#[derive(Debug, Clone, Copy)]
pub struct Asteroid {
    pub radius: f32,
    pub distance: f32,
    /// Radians, small tilt out of the ecliptic.
    pub inclination: f32,
    /// Starting angle on the belt circle.
    pub orbital_phase: f32,
    /// Degrees per simulation second.
    pub rotation_speed: f32,
    /// Unit spin axis.
    pub rotation_axis: Vec3,
}

impl Asteroid {
    /// World transform at simulation time `t`. Pure — no state is touched.
    pub fn model_matrix(&self, t: f32) -> Mat4 {
        let orbit_angle = self.orbital_phase + TAU * t / BELT_ORBIT_PERIOD;
        let translation = Vec3::new(
            self.distance * orbit_angle.cos(),
            self.inclination.sin() * 1.5,
            self.distance * orbit_angle.sin(),
        );
        let spin = (t * self.rotation_speed).to_radians();
        Mat4::from_translation(translation)
            * Mat4::from_axis_angle(self.rotation_axis, spin)
            * Mat4::from_scale(Vec3::splat(self.radius))
    }
}

/// The belt: a fixed population of rocks sharing the planet shader.
pub struct AsteroidField {
    asteroids: Vec<Asteroid>,
    texture: TextureId,
}

impl AsteroidField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let mut asteroids = Vec::with_capacity(count);
        for _ in 0..count {
            let theta = rng.range(0.0, TAU);
            let phi = rng.range(0.0, std::f32::consts::PI);
            asteroids.push(Asteroid {
                radius: rng.range(RADIUS_MIN, RADIUS_MAX),
                distance: rng.range(DISTANCE_MIN, DISTANCE_MAX),
                inclination: rng.range(-INCLINATION_MAX, INCLINATION_MAX),
                orbital_phase: rng.range(0.0, TAU),
                rotation_speed: rng.range(SPIN_MIN_DEG, SPIN_MAX_DEG),
                rotation_axis: Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.sin() * theta.sin(),
                    phi.cos(),
                )
                .normalize_or_zero(),
            });
        }
        Self {
            asteroids,
            texture: TextureId::INVALID,
        }
    }

    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    /// Resolve the surface texture, falling back to flat gray.
    pub fn init_resources(
        &mut self,
        backend: &mut dyn RenderBackend,
        decoder: &mut dyn AssetDecoder,
        path: Option<&str>,
    ) {
        self.texture = match path {
            Some(p) => textures::load_or_fallback(decoder, backend, p, textures::solid_color(150, 150, 150)),
            None => backend.create_texture(&textures::solid_color(150, 150, 150)),
        };
    }

    /// Draw the belt with the planet program (same lighting as the bodies).
    /// The program carries this frame's view/projection already; only the
    /// per-rock model matrix changes. No-op when the program is invalid.
    pub fn render(
        &self,
        backend: &mut dyn RenderBackend,
        planet_program: ProgramId,
        sphere_mesh: MeshId,
        sim_time: f32,
    ) {
        if !planet_program.is_valid() {
            return;
        }
        backend.use_program(planet_program);
        backend.bind_texture(0, self.texture);
        backend.set_i32("texture1", 0);
        backend.set_i32("isSun", 0);

        for asteroid in &self.asteroids {
            backend.set_mat4("model", &asteroid.model_matrix(sim_time));
            backend.draw_mesh(sphere_mesh);
        }
    }

    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        if self.texture.is_valid() {
            backend.destroy_texture(self.texture);
            self.texture = TextureId::INVALID;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_field() {
        let a = AsteroidField::new(50, 99);
        let b = AsteroidField::new(50, 99);
        for (x, y) in a.asteroids().iter().zip(b.asteroids()) {
            assert_eq!(x.distance, y.distance);
            assert_eq!(x.orbital_phase, y.orbital_phase);
            assert_eq!(x.rotation_axis, y.rotation_axis);
        }
    }

    #[test]
    fn parameters_within_belt_ranges() {
        let field = AsteroidField::new(200, 7);
        for ast in field.asteroids() {
            assert!(ast.distance >= DISTANCE_MIN && ast.distance < DISTANCE_MAX);
            assert!(ast.radius >= RADIUS_MIN && ast.radius < RADIUS_MAX);
            assert!(ast.inclination.abs() <= INCLINATION_MAX);
            assert!((ast.rotation_axis.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn transform_is_pure() {
        let field = AsteroidField::new(10, 3);
        let ast = field.asteroids()[4];
        assert_eq!(ast.model_matrix(12.5), ast.model_matrix(12.5));
    }

    #[test]
    fn belt_orbit_is_periodic() {
        let field = AsteroidField::new(5, 11);
        let ast = field.asteroids()[0];
        let a = ast.model_matrix(3.0).w_axis;
        let b = ast.model_matrix(3.0 + BELT_ORBIT_PERIOD).w_axis;
        // translation repeats each belt period (spin generally does not)
        assert!((a.truncate() - b.truncate()).length() < 1e-3);
    }

    #[test]
    fn rock_stays_on_its_circle() {
        let field = AsteroidField::new(5, 13);
        let ast = field.asteroids()[2];
        for i in 0..10 {
            let t = i as f32 * 2.3;
            let pos = ast.model_matrix(t).w_axis.truncate();
            let planar = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!((planar - ast.distance).abs() < 1e-3);
        }
    }
}
