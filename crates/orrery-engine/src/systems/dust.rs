//! Drifting space dust.
//!
//! Unlike every other layer, dust is stateful: positions integrate by
//! `velocity * dt` each frame, and the opacity pulsation samples wall-clock
//! time rather than simulation time, so pausing the clock leaves the dust
//! alive. Its exact output therefore depends on frame-time history — runs
//! with different frame pacing are only statistically similar, never
//! bit-identical.

use glam::{Mat4, Vec3};
use std::f32::consts::TAU;

use crate::assets::textures::{self, AssetDecoder};
use crate::renderer::traits::{
    MeshId, ProgramId, RenderBackend, ShaderSource, TextureId,
};
use crate::systems::rng::Rng;

pub const DEFAULT_DUST_COUNT: usize = 5000;

const DISTANCE_MIN: f32 = 50.0;
const DISTANCE_MAX: f32 = 300.0;
const BASE_SIZE: f32 = 0.03;
const BASE_VELOCITY: f32 = 0.5;
const BASE_SPIN_DEG: f32 = 10.0;

/// One dust mote.
#[derive(Debug, Clone, Copy)]
struct DustParticle {
    position: Vec3,
    velocity: Vec3,
    size: f32,
    /// Pulsating opacity factor, recomputed every update.
    life: f32,
    /// Billboard roll, degrees.
    rotation: f32,
    rotation_speed: f32,
}

/// Camera-facing dust billboards filling the space around the system.
pub struct DustField {
    particles: Vec<DustParticle>,
    texture: TextureId,
    program: ProgramId,
    quad: MeshId,
}

impl DustField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let radius = rng.range(DISTANCE_MIN, DISTANCE_MAX);
            let theta = rng.range(0.0, TAU);
            let phi = (2.0 * rng.next_f32() - 1.0).acos();
            let position = Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin() * 0.3,
                radius * phi.cos(),
            );
            // drift along the tangent of the vertical axis
            let tangent = position.cross(Vec3::Y).normalize_or_zero();
            particles.push(DustParticle {
                position,
                velocity: tangent * (BASE_VELOCITY + rng.next_f32() * 0.3),
                size: BASE_SIZE * rng.range(0.8, 1.2),
                life: 1.0,
                rotation: rng.range(0.0, 360.0),
                rotation_speed: BASE_SPIN_DEG * rng.range(0.5, 1.5),
            });
        }
        Self {
            particles,
            texture: TextureId::INVALID,
            program: ProgramId::INVALID,
            quad: MeshId::INVALID,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Compile the billboard program and resolve the sprite texture
    /// (procedural radial sprite when the file is missing).
    pub fn init_resources(
        &mut self,
        backend: &mut dyn RenderBackend,
        decoder: &mut dyn AssetDecoder,
        sprite_path: Option<&str>,
    ) {
        self.program = backend.compile_program(
            &ShaderSource::Path("shader/dust.vert".into()),
            &ShaderSource::Path("shader/dust.frag".into()),
        );
        if !self.program.is_valid() {
            log::error!("dust billboard program failed to compile; dust layer disabled");
        }
        self.quad = backend.create_quad_mesh();
        self.texture = match sprite_path {
            Some(p) => textures::load_or_fallback(decoder, backend, p, textures::dust_sprite()),
            None => backend.create_texture(&textures::dust_sprite()),
        };
    }

    /// Integrate drift and recompute the opacity pulse.
    /// `wall_time` is unscaled wall-clock seconds.
    pub fn update(&mut self, dt: f32, wall_time: f32) {
        for p in &mut self.particles {
            p.position += p.velocity * dt;
            p.rotation += p.rotation_speed * dt;
            if p.rotation > 360.0 {
                p.rotation -= 360.0;
            }
            p.life = 0.8 + 0.2 * (wall_time * 2.0 + p.position.x).sin();
        }
    }

    /// Draw every mote as a camera-facing quad. Alpha-blended; assumes the
    /// composer has standard alpha blending active. No-op when the program
    /// failed to compile.
    pub fn render(
        &self,
        backend: &mut dyn RenderBackend,
        view: &Mat4,
        projection: &Mat4,
        camera_front: Vec3,
        camera_up: Vec3,
    ) {
        if !self.program.is_valid() {
            return;
        }
        backend.use_program(self.program);
        backend.set_mat4("view", view);
        backend.set_mat4("projection", projection);

        let right = camera_front.cross(camera_up).normalize_or_zero();
        let up = right.cross(camera_front).normalize_or_zero();
        backend.set_vec3("cameraRight", right);
        backend.set_vec3("cameraUp", up);
        backend.bind_texture(0, self.texture);
        backend.set_i32("sprite", 0);

        for p in &self.particles {
            if p.life <= 0.0 {
                continue;
            }
            let model = Mat4::from_translation(p.position)
                * Mat4::from_rotation_z(p.rotation.to_radians());
            backend.set_mat4("model", &model);
            backend.set_f32("size", p.size * p.life);
            backend.draw_mesh(self.quad);
        }
    }

    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        if self.quad.is_valid() {
            backend.destroy_mesh(self.quad);
            self.quad = MeshId::INVALID;
        }
        if self.texture.is_valid() {
            backend.destroy_texture(self.texture);
            self.texture = TextureId::INVALID;
        }
        if self.program.is_valid() {
            backend.destroy_program(self.program);
            self.program = ProgramId::INVALID;
        }
    }

    #[cfg(test)]
    fn positions(&self) -> Vec<Vec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    #[cfg(test)]
    fn lives(&self) -> Vec<f32> {
        self.particles.iter().map(|p| p.life).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_field() {
        let a = DustField::new(100, 21);
        let b = DustField::new(100, 21);
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn particles_start_inside_shell() {
        let field = DustField::new(500, 3);
        for pos in field.positions() {
            // y is compressed, so compare against the uncompressed radius
            let r = Vec3::new(pos.x, pos.y / 0.3, pos.z).length();
            assert!(r >= DISTANCE_MIN - 1e-3 && r <= DISTANCE_MAX + 1e-3, "r={r}");
        }
    }

    #[test]
    fn update_integrates_velocity() {
        let mut field = DustField::new(50, 5);
        let before = field.positions();
        field.update(1.0, 0.0);
        let after = field.positions();
        let moved = before
            .iter()
            .zip(&after)
            .filter(|(a, b)| (**a - **b).length() > 1e-6)
            .count();
        // all but the (measure-zero) degenerate tangent cases drift
        assert!(moved > 45, "only {moved} particles moved");
    }

    #[test]
    fn life_pulsation_tracks_wall_clock() {
        let mut a = DustField::new(50, 9);
        let mut b = DustField::new(50, 9);
        // same dt, different wall time → different pulse phase
        a.update(0.0, 1.0);
        b.update(0.0, 2.0);
        assert_ne!(a.lives(), b.lives());
        // life stays inside [0.6, 1.0]
        for life in a.lives() {
            assert!((0.6..=1.0).contains(&life));
        }
    }

    #[test]
    fn zero_dt_freezes_positions_but_not_pulse() {
        let mut field = DustField::new(20, 13);
        let before = field.positions();
        field.update(0.0, 5.0);
        assert_eq!(before, field.positions());
    }
}
