//! Recording backend test double.
//!
//! Implements `RenderBackend` by appending every state transition and draw
//! submission to an event log, so tests can assert draw ordering, blend and
//! depth bookkeeping, and per-layer draw counts without a GPU.

use glam::{Mat4, Vec2, Vec3};
use std::collections::HashMap;

use super::traits::{
    BlendMode, DepthFunc, MeshId, PixelBuffer, ProgramId, RenderBackend, ShaderSource, TextureId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UseProgram(u32),
    Uniform1i(String, i32),
    BindTexture(u32, u32),
    BindCubemap(u32, u32),
    DrawMesh(u32),
    DrawLines(u32),
    SetBlend(BlendMode),
    SetDepthTest(bool),
    SetDepthWrite(bool),
    SetDepthFunc(DepthFunc),
}

pub struct RecordingBackend {
    pub events: Vec<Event>,
    /// Simulate shader compile failures.
    pub fail_programs: bool,
    next_handle: u32,
    mesh_kinds: HashMap<u32, &'static str>,
    created_textures: Vec<u32>,
    created_programs: Vec<u32>,
    pub destroyed_meshes: Vec<u32>,
    pub destroyed_textures: Vec<u32>,
    pub destroyed_programs: Vec<u32>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            fail_programs: false,
            next_handle: 1,
            mesh_kinds: HashMap::new(),
            created_textures: Vec::new(),
            created_programs: Vec::new(),
            destroyed_meshes: Vec::new(),
            destroyed_textures: Vec::new(),
            destroyed_programs: Vec::new(),
        }
    }

    fn alloc(&mut self) -> u32 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    fn alloc_mesh(&mut self, kind: &'static str) -> MeshId {
        let h = self.alloc();
        self.mesh_kinds.insert(h, kind);
        MeshId(h)
    }

    /// Number of triangle draws submitted against meshes of this kind.
    pub fn draws_of(&self, kind: &str) -> usize {
        self.events
            .iter()
            .filter(|e| match e {
                Event::DrawMesh(id) => self.mesh_kinds.get(id) == Some(&kind),
                _ => false,
            })
            .count()
    }

    pub fn line_draws(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::DrawLines(_)))
            .count()
    }

    pub fn created_mesh_count(&self) -> usize {
        self.mesh_kinds.len()
    }

    pub fn created_texture_count(&self) -> usize {
        self.created_textures.len()
    }

    pub fn created_program_count(&self) -> usize {
        self.created_programs.len()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for RecordingBackend {
    fn compile_program(&mut self, _vertex: &ShaderSource, _fragment: &ShaderSource) -> ProgramId {
        if self.fail_programs {
            return ProgramId::INVALID;
        }
        let h = self.alloc();
        self.created_programs.push(h);
        ProgramId(h)
    }

    fn use_program(&mut self, program: ProgramId) {
        self.events.push(Event::UseProgram(program.0));
    }

    fn set_mat4(&mut self, _name: &str, _value: &Mat4) {}
    fn set_vec3(&mut self, _name: &str, _value: Vec3) {}
    fn set_vec2(&mut self, _name: &str, _value: Vec2) {}
    fn set_f32(&mut self, _name: &str, _value: f32) {}

    fn set_i32(&mut self, name: &str, value: i32) {
        self.events.push(Event::Uniform1i(name.to_string(), value));
    }

    fn create_texture(&mut self, _pixels: &PixelBuffer) -> TextureId {
        let h = self.alloc();
        self.created_textures.push(h);
        TextureId(h)
    }

    fn create_cubemap(&mut self, _faces: &[PixelBuffer; 6]) -> TextureId {
        let h = self.alloc();
        self.created_textures.push(h);
        TextureId(h)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.events.push(Event::BindTexture(unit, texture.0));
    }

    fn bind_cubemap(&mut self, unit: u32, texture: TextureId) {
        self.events.push(Event::BindCubemap(unit, texture.0));
    }

    fn create_sphere_mesh(&mut self, _segments: u32, _rings: u32) -> MeshId {
        self.alloc_mesh("sphere")
    }

    fn create_ring_mesh(&mut self, _inner: f32, _outer: f32, _segments: u32) -> MeshId {
        self.alloc_mesh("ring")
    }

    fn create_quad_mesh(&mut self) -> MeshId {
        self.alloc_mesh("quad")
    }

    fn create_circle_mesh(&mut self, _segments: u32) -> MeshId {
        self.alloc_mesh("circle")
    }

    fn create_cube_mesh(&mut self) -> MeshId {
        self.alloc_mesh("cube")
    }

    fn draw_mesh(&mut self, mesh: MeshId) {
        self.events.push(Event::DrawMesh(mesh.0));
    }

    fn draw_lines(&mut self, mesh: MeshId) {
        self.events.push(Event::DrawLines(mesh.0));
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.events.push(Event::SetBlend(mode));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.events.push(Event::SetDepthTest(enabled));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.events.push(Event::SetDepthWrite(enabled));
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.events.push(Event::SetDepthFunc(func));
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        self.destroyed_meshes.push(mesh.0);
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.destroyed_textures.push(texture.0);
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.destroyed_programs.push(program.0);
    }
}
