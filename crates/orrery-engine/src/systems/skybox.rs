//! Star-field skybox.
//!
//! Drawn after the scene with a `<=` depth comparison so fragments at the
//! far plane still pass, and with the view translation stripped so the box
//! never parallaxes — only camera rotation reaches it.

use glam::{Mat4, Vec4};

use crate::assets::textures::{self, AssetDecoder};
use crate::renderer::traits::{
    DepthFunc, MeshId, ProgramId, RenderBackend, ShaderSource, TextureId,
};

pub struct SkyboxPass {
    program: ProgramId,
    cubemap: TextureId,
    cube: MeshId,
}

/// Remove the translation column, keeping rotation only.
fn strip_translation(view: &Mat4) -> Mat4 {
    let mut m = *view;
    m.w_axis = Vec4::new(0.0, 0.0, 0.0, 1.0);
    m
}

impl SkyboxPass {
    pub fn new() -> Self {
        Self {
            program: ProgramId::INVALID,
            cubemap: TextureId::INVALID,
            cube: MeshId::INVALID,
        }
    }

    pub fn init_resources(
        &mut self,
        backend: &mut dyn RenderBackend,
        decoder: &mut dyn AssetDecoder,
        faces: Option<&[String; 6]>,
    ) {
        self.program = backend.compile_program(
            &ShaderSource::Path("shader/skybox.vert".into()),
            &ShaderSource::Path("shader/skybox.frag".into()),
        );
        if !self.program.is_valid() {
            log::error!("skybox program failed to compile; skybox disabled");
        }
        self.cube = backend.create_cube_mesh();
        self.cubemap = match faces {
            Some(f) => textures::load_cubemap_or_fallback(decoder, backend, f),
            None => {
                let dark = textures::solid_color(5, 5, 13);
                let faces = std::array::from_fn(|_| dark.clone());
                backend.create_cubemap(&faces)
            }
        };
    }

    /// Draw the box. No-op if the program or cubemap is missing.
    pub fn render(&self, backend: &mut dyn RenderBackend, view: &Mat4, projection: &Mat4) {
        if !self.program.is_valid() || !self.cubemap.is_valid() {
            return;
        }
        backend.set_depth_func(DepthFunc::LessEqual);
        backend.use_program(self.program);
        backend.set_mat4("view", &strip_translation(view));
        backend.set_mat4("projection", projection);
        backend.bind_cubemap(0, self.cubemap);
        backend.set_i32("skybox", 0);
        backend.draw_mesh(self.cube);
        backend.set_depth_func(DepthFunc::Less);
    }

    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        if self.cube.is_valid() {
            backend.destroy_mesh(self.cube);
            self.cube = MeshId::INVALID;
        }
        if self.cubemap.is_valid() {
            backend.destroy_texture(self.cubemap);
            self.cubemap = TextureId::INVALID;
        }
        if self.program.is_valid() {
            backend.destroy_program(self.program);
            self.program = ProgramId::INVALID;
        }
    }
}

impl Default for SkyboxPass {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn strip_translation_keeps_rotation() {
        let view = Mat4::look_at_rh(Vec3::new(10.0, 20.0, 30.0), Vec3::ZERO, Vec3::Y);
        let stripped = strip_translation(&view);
        assert_eq!(stripped.w_axis, Vec4::new(0.0, 0.0, 0.0, 1.0));
        // rotation part untouched
        assert_eq!(stripped.x_axis, view.x_axis);
        assert_eq!(stripped.y_axis, view.y_axis);
        assert_eq!(stripped.z_axis, view.z_axis);
    }

    #[test]
    fn identity_view_strips_to_identity() {
        assert_eq!(strip_translation(&Mat4::IDENTITY), Mat4::IDENTITY);
    }
}
