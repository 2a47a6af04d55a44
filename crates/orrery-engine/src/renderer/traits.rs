//! Render backend trait for platform GPU backends.
//!
//! The engine is headless: all draw submission goes through this trait so a
//! GL window, a wgpu surface, or a recording test double can sit behind it.
//! Handles are opaque integers; `0` is the shared "invalid" sentinel a
//! backend returns when compilation or upload fails. Every system treats a
//! draw against an invalid program as a guarded no-op rather than an error.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

/// Compiled shader program handle. 0 = invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProgramId(pub u32);

/// GPU texture handle (2D or cubemap). 0 = invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

/// Uploaded mesh handle. 0 = invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshId(pub u32);

macro_rules! impl_handle {
    ($name:ident) => {
        impl $name {
            pub const INVALID: $name = $name(0);

            pub fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

impl_handle!(ProgramId);
impl_handle!(TextureId);
impl_handle!(MeshId);

/// Fixed-function blend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// src_alpha / one_minus_src_alpha — the standard state.
    Alpha,
    /// src_alpha / one — glow and flare accumulation.
    Additive,
}

/// Depth comparison function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    /// Used by the skybox pass so far-plane fragments still pass.
    LessEqual,
}

/// Shader source, either a file path for the backend to read or literal text.
#[derive(Debug, Clone)]
pub enum ShaderSource {
    Path(String),
    Literal(String),
}

/// A decoded (or procedurally generated) pixel buffer.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// 3 = RGB, 4 = RGBA.
    pub channels: u32,
    pub data: Vec<u8>,
}

/// Per-frame uniform block shared by every opaque pass.
/// Pod so backends can upload it as one buffer write.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SharedUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _pad: f32,
}

impl SharedUniforms {
    pub fn new(view: Mat4, projection: Mat4, camera_pos: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            camera_pos: camera_pos.to_array(),
            _pad: 0.0,
        }
    }
}

/// GPU backend capability consumed by the scene composer and sub-systems.
///
/// Implementors own the actual graphics API objects. All mesh construction
/// (sphere tessellation, ring annulus, quads) happens behind this trait —
/// the engine only holds handles.
pub trait RenderBackend {
    /// Compile and link a program. Returns `ProgramId::INVALID` on failure
    /// (the backend is expected to log the diagnostic).
    fn compile_program(&mut self, vertex: &ShaderSource, fragment: &ShaderSource) -> ProgramId;
    fn use_program(&mut self, program: ProgramId);

    fn set_mat4(&mut self, name: &str, value: &Mat4);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_vec2(&mut self, name: &str, value: Vec2);
    fn set_f32(&mut self, name: &str, value: f32);
    fn set_i32(&mut self, name: &str, value: i32);

    /// Upload a 2D texture. Returns `TextureId::INVALID` on failure.
    fn create_texture(&mut self, pixels: &PixelBuffer) -> TextureId;
    /// Upload a cubemap from six face buffers (+X −X +Y −Y +Z −Z).
    fn create_cubemap(&mut self, faces: &[PixelBuffer; 6]) -> TextureId;
    fn bind_texture(&mut self, unit: u32, texture: TextureId);
    fn bind_cubemap(&mut self, unit: u32, texture: TextureId);

    /// UV sphere with the given longitude/latitude segment counts.
    fn create_sphere_mesh(&mut self, segments: u32, rings: u32) -> MeshId;
    /// Flat annulus in the XZ plane.
    fn create_ring_mesh(&mut self, inner_radius: f32, outer_radius: f32, segments: u32) -> MeshId;
    /// Unit quad in the XY plane (billboards, screen-space flares).
    fn create_quad_mesh(&mut self) -> MeshId;
    /// Unit circle line loop in the XZ plane (orbit guides).
    fn create_circle_mesh(&mut self, segments: u32) -> MeshId;
    /// Unit cube with inward-facing winding (skybox).
    fn create_cube_mesh(&mut self) -> MeshId;

    /// Indexed triangle draw.
    fn draw_mesh(&mut self, mesh: MeshId);
    /// Line-loop draw (orbit guides).
    fn draw_lines(&mut self, mesh: MeshId);

    fn set_blend(&mut self, mode: BlendMode);
    fn set_depth_test(&mut self, enabled: bool);
    fn set_depth_write(&mut self, enabled: bool);
    fn set_depth_func(&mut self, func: DepthFunc);

    /// Release a resource exactly once during shutdown.
    fn destroy_mesh(&mut self, mesh: MeshId);
    fn destroy_texture(&mut self, texture: TextureId);
    fn destroy_program(&mut self, program: ProgramId);
}
