pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::app::{Orrery, OrreryConfig};
pub use assets::manifest::SceneManifest;
pub use assets::textures::{AssetDecoder, NullDecoder};
pub use components::body::{Atmosphere, Attachment, CelestialBody, Moon, Ring, solar_system};
pub use self::core::clock::SimulationClock;
pub use input::queue::{InputEvent, InputQueue, Layer};
pub use renderer::camera::{Camera, FocusMode, MoveDir};
pub use renderer::traits::{
    BlendMode, DepthFunc, MeshId, PixelBuffer, ProgramId, RenderBackend, ShaderSource,
    SharedUniforms, TextureId,
};
pub use systems::asteroids::AsteroidField;
pub use systems::composer::{FrameContext, LayerToggles, SceneComposer};
pub use systems::dust::DustField;
pub use systems::flare::LensFlareSystem;
pub use systems::skybox::SkyboxPass;
