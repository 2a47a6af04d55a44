//! Screen-space lens flare.
//!
//! Elements are quads placed along the line from the sun's projected screen
//! position toward the screen center; fractions past 1.0 land beyond the
//! center ("ghosts"). Visibility is a frustum test on the sun's clip-space
//! position — real behind-geometry occlusion (depth-buffer readback) is a
//! known limitation, not implemented.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::renderer::traits::{
    BlendMode, MeshId, PixelBuffer, ProgramId, RenderBackend, ShaderSource, TextureId,
};

/// One flare quad on the sun→center line.
#[derive(Debug, Clone, Copy)]
pub struct FlareElement {
    /// Fraction along the sun→center line. 0 = at the sun, 1 = screen
    /// center, >1 = past the center.
    pub position: f32,
    /// Quad half-size in NDC.
    pub size: f32,
    pub color: Vec3,
    pub brightness: f32,
    /// Index into the four procedural flare textures.
    pub texture_index: usize,
}

/// The reference element table: main glow at the sun, a run of streaks and
/// halos toward the center, three ghosts past it.
pub fn default_elements() -> Vec<FlareElement> {
    let e = |position, size, color: (f32, f32, f32), brightness, texture_index| FlareElement {
        position,
        size,
        color: Vec3::new(color.0, color.1, color.2),
        brightness,
        texture_index,
    };
    vec![
        e(0.0, 0.80, (1.0, 0.9, 0.7), 1.0, 0),
        e(0.0, 0.50, (1.0, 1.0, 1.0), 0.6, 1),
        e(0.1, 0.15, (1.0, 0.8, 0.5), 0.5, 2),
        e(0.3, 0.12, (0.8, 0.9, 1.0), 0.4, 3),
        e(0.5, 0.18, (1.0, 0.7, 0.4), 0.4, 2),
        e(0.7, 0.10, (0.9, 0.8, 1.0), 0.3, 3),
        e(0.9, 0.14, (1.0, 0.9, 0.6), 0.35, 2),
        e(1.2, 0.20, (0.7, 0.9, 1.0), 0.3, 1),
        e(1.5, 0.16, (1.0, 0.8, 0.7), 0.25, 3),
        e(1.8, 0.12, (0.8, 1.0, 0.9), 0.2, 2),
    ]
}

/// Frustum-visibility factor for the sun in [0, 1].
///
/// Exactly 0 when the sun is behind the camera (`w <= 0`) or any NDC axis
/// leaves [−1, 1]; otherwise the per-axis edge fades (linear from 0.8 to
/// the edge) multiplied together — 1.0 at screen center.
pub fn occlusion(sun_world: Vec3, view: &Mat4, projection: &Mat4) -> f32 {
    let clip = *projection * *view * Vec4::new(sun_world.x, sun_world.y, sun_world.z, 1.0);
    if clip.w <= 0.0 {
        return 0.0;
    }
    let ndc = clip.truncate() / clip.w;
    if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 || ndc.z < -1.0 || ndc.z > 1.0 {
        return 0.0;
    }

    let mut fade = 1.0;
    let edge_x = ndc.x.abs();
    let edge_y = ndc.y.abs();
    if edge_x > 0.8 {
        fade *= 1.0 - (edge_x - 0.8) / 0.2;
    }
    if edge_y > 0.8 {
        fade *= 1.0 - (edge_y - 0.8) / 0.2;
    }
    fade
}

/// Sun position in NDC (perspective-divided). Only meaningful when the
/// occlusion factor is nonzero.
fn sun_screen_pos(sun_world: Vec3, view: &Mat4, projection: &Mat4) -> Vec2 {
    let clip = *projection * *view * Vec4::new(sun_world.x, sun_world.y, sun_world.z, 1.0);
    Vec2::new(clip.x / clip.w, clip.y / clip.w)
}

/// Procedural 128×128 RGBA flare texture.
/// 0 = soft glow, 1 = halo ring, 2 = sharp circle, 3 = hexagonal aperture.
pub fn flare_texture(kind: usize) -> PixelBuffer {
    const SIZE: u32 = 128;
    let half = SIZE as f32 / 2.0;
    let mut data = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = (x as f32 - half) / half;
            let dy = (y as f32 - half) / half;
            let dist = (dx * dx + dy * dy).sqrt();

            let mut intensity = match kind {
                0 => (1.0 - dist).max(0.0).powf(2.0),
                1 => (-((dist - 0.7) * 5.0).powi(2)).exp(),
                2 => {
                    if dist < 0.8 {
                        (1.0 - dist / 0.8).powf(3.0)
                    } else {
                        0.0
                    }
                }
                _ => {
                    let angle = dy.atan2(dx);
                    let hex_dist = dist * (1.0 + 0.2 * (angle * 6.0).cos());
                    (1.0 - hex_dist).max(0.0).powf(2.5)
                }
            };

            // subtle spatial noise so the discs aren't perfectly clean
            let noise = ((x as f32 * 0.5).sin() * (y as f32 * 0.3).cos() + 1.0) * 0.5;
            intensity *= 0.9 + noise * 0.1;

            let value = (intensity * 255.0) as u8;
            data.extend_from_slice(&[value, value, value, value]);
        }
    }
    PixelBuffer {
        width: SIZE,
        height: SIZE,
        channels: 4,
        data,
    }
}

/// The flare pass. Owns its quad, program, and the four generated textures.
pub struct LensFlareSystem {
    elements: Vec<FlareElement>,
    textures: Vec<TextureId>,
    program: ProgramId,
    quad: MeshId,
    pub global_intensity: f32,
}

impl LensFlareSystem {
    pub fn new() -> Self {
        Self {
            elements: default_elements(),
            textures: Vec::new(),
            program: ProgramId::INVALID,
            quad: MeshId::INVALID,
            global_intensity: 1.0,
        }
    }

    pub fn elements(&self) -> &[FlareElement] {
        &self.elements
    }

    pub fn init_resources(&mut self, backend: &mut dyn RenderBackend) {
        self.program = backend.compile_program(
            &ShaderSource::Path("shader/lensflare.vert".into()),
            &ShaderSource::Path("shader/lensflare.frag".into()),
        );
        if !self.program.is_valid() {
            log::error!("lens flare program failed to compile; flare layer disabled");
        }
        self.quad = backend.create_quad_mesh();
        self.textures = (0..4)
            .map(|kind| backend.create_texture(&flare_texture(kind)))
            .collect();
    }

    /// Opacity of one element given the precomputed frame factors.
    fn element_opacity(&self, element: &FlareElement, occlusion: f32, sun_to_center: Vec2) -> f32 {
        let dist_from_sun = sun_to_center.length() * element.position.abs();
        let distance_fade = 1.0 / (1.0 + dist_from_sun * 2.0);
        element.brightness * occlusion * distance_fade * self.global_intensity
    }

    /// Draw the flare quads. Must run after everything else has resolved in
    /// the depth/color buffers: depth testing goes off and blending goes
    /// additive for the pass, then standard alpha blending and depth testing
    /// are restored.
    pub fn render(
        &self,
        backend: &mut dyn RenderBackend,
        sun_world: Vec3,
        view: &Mat4,
        projection: &Mat4,
    ) {
        if !self.program.is_valid() {
            return;
        }
        let occlusion = occlusion(sun_world, view, projection);
        if occlusion < 0.01 {
            return;
        }
        let sun_pos = sun_screen_pos(sun_world, view, projection);
        let sun_to_center = -sun_pos; // screen center is NDC origin

        backend.set_blend(BlendMode::Additive);
        backend.set_depth_test(false);
        backend.use_program(self.program);

        for element in &self.elements {
            let flare_pos = sun_pos + sun_to_center * element.position;
            if flare_pos.x.abs() > 2.0 || flare_pos.y.abs() > 2.0 {
                continue;
            }
            let opacity = self.element_opacity(element, occlusion, sun_to_center);
            if opacity < 0.01 {
                continue;
            }
            backend.set_vec2("flarePosition", flare_pos);
            backend.set_f32("flareSize", element.size);
            backend.set_vec3("flareColor", element.color);
            backend.set_f32("flareOpacity", opacity);
            backend.bind_texture(0, self.textures[element.texture_index]);
            backend.set_i32("flareTexture", 0);
            backend.draw_mesh(self.quad);
        }

        backend.set_depth_test(true);
        backend.set_blend(BlendMode::Alpha);
    }

    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        for tex in self.textures.drain(..) {
            if tex.is_valid() {
                backend.destroy_texture(tex);
            }
        }
        if self.quad.is_valid() {
            backend.destroy_mesh(self.quad);
            self.quad = MeshId::INVALID;
        }
        if self.program.is_valid() {
            backend.destroy_program(self.program);
            self.program = ProgramId::INVALID;
        }
    }
}

impl Default for LensFlareSystem {
    fn default() -> Self {
        Self::new()
    }
}
