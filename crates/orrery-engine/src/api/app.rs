//! The `Orrery` application object: one simulation clock, one camera, one
//! scene composer, driven by a single-threaded frame loop.
//!
//! The host owns the window and polls raw input; each displayed frame it
//! fills an `InputQueue` and calls [`Orrery::frame`]. All mutable state is
//! owned here and touched only between frames — there is no concurrency to
//! reason about. Stopping is just "stop calling frame" once
//! [`Orrery::should_quit`] reports true, followed by one
//! [`Orrery::shutdown`] call.

use crate::assets::manifest::SceneManifest;
use crate::assets::textures::AssetDecoder;
use crate::components::body::solar_system;
use crate::core::clock::SimulationClock;
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::camera::Camera;
use crate::renderer::traits::RenderBackend;
use crate::systems::asteroids::DEFAULT_ASTEROID_COUNT;
use crate::systems::composer::{FrameContext, SceneComposer};
use crate::systems::dust::DEFAULT_DUST_COUNT;

/// Engine tuning, provided by the host once at startup.
#[derive(Debug, Clone)]
pub struct OrreryConfig {
    /// Framebuffer size, for the projection aspect ratio.
    pub screen_width: u32,
    pub screen_height: u32,
    pub asteroid_count: usize,
    pub dust_count: usize,
    /// Seed for the particle fields. Same seed, same fields.
    pub seed: u64,
    /// Exponential camera approach when focused (instant snap when false).
    pub camera_smoothing: bool,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            screen_width: 1380,
            screen_height: 720,
            asteroid_count: DEFAULT_ASTEROID_COUNT,
            dust_count: DEFAULT_DUST_COUNT,
            seed: 42,
            camera_smoothing: true,
        }
    }
}

pub struct Orrery {
    config: OrreryConfig,
    pub clock: SimulationClock,
    pub camera: Camera,
    pub composer: SceneComposer,
    quit: bool,
}

impl Orrery {
    /// Build the reference nine-body scene.
    pub fn new(config: OrreryConfig) -> Self {
        let composer = SceneComposer::new(
            solar_system(),
            config.asteroid_count,
            config.dust_count,
            config.seed,
        );
        let mut camera = Camera::new();
        camera.smoothing = config.camera_smoothing;
        Self {
            config,
            clock: SimulationClock::new(),
            camera,
            composer,
            quit: false,
        }
    }

    /// Resolve every GPU resource. Never fails: missing assets fall back to
    /// procedural placeholders, failed programs degrade their layer to a
    /// no-op.
    pub fn init(
        &mut self,
        backend: &mut dyn RenderBackend,
        decoder: &mut dyn AssetDecoder,
        manifest: &SceneManifest,
    ) {
        self.composer.init_resources(backend, decoder, manifest);
        log::info!(
            "scene initialized: {} bodies, {} asteroids, {} dust particles",
            self.composer.bodies.len(),
            self.config.asteroid_count,
            self.config.dust_count,
        );
    }

    /// One displayed frame: drain input, advance the clock, update the
    /// camera, submit the scene.
    pub fn frame(&mut self, dt: f32, input: &mut InputQueue, backend: &mut dyn RenderBackend) {
        for event in input.drain() {
            self.apply_event(event, dt);
        }

        self.clock.advance(dt);
        let t = self.clock.sim_time();

        if let Some(index) = self.camera.focused_body() {
            let body_pos = self.composer.bodies[index].position(t);
            self.camera.follow(body_pos, dt);
        }

        let aspect = self.config.screen_width as f32 / self.config.screen_height as f32;
        let frame = FrameContext {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(aspect),
            camera_pos: self.camera.position,
            camera_front: self.camera.front,
            camera_up: self.camera.up,
            sim_time: t,
            wall_time: self.clock.wall_time(),
            dt,
        };
        self.composer.render(backend, &frame);
    }

    fn apply_event(&mut self, event: InputEvent, dt: f32) {
        match event {
            InputEvent::Move { dir } => self.camera.apply_move(dir, dt),
            InputEvent::Look { dx, dy } => self.camera.apply_look(dx, dy),
            InputEvent::Scroll { delta } => self.camera.apply_scroll(delta),
            InputEvent::TogglePause => self.clock.toggle_pause(),
            InputEvent::TimeScale { delta } => self.clock.adjust_time_scale(delta),
            InputEvent::Toggle { layer } => self.composer.toggles.flip(layer),
            InputEvent::Focus { body } => {
                if body < self.composer.bodies.len() {
                    self.camera.focus_on(body);
                } else {
                    log::warn!("focus request for body {body} out of range");
                }
            }
            InputEvent::Release => self.camera.release(),
            InputEvent::Quit => self.quit = true,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Release GPU resources exactly once, leaf systems first.
    pub fn shutdown(&mut self, backend: &mut dyn RenderBackend) {
        self.composer.cleanup(backend);
        log::info!("scene resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::textures::NullDecoder;
    use crate::input::queue::Layer;
    use crate::renderer::recording::RecordingBackend;

    fn orrery() -> (Orrery, RecordingBackend) {
        let mut backend = RecordingBackend::new();
        let mut orrery = Orrery::new(OrreryConfig {
            asteroid_count: 5,
            dust_count: 5,
            ..OrreryConfig::default()
        });
        orrery.init(&mut backend, &mut NullDecoder, &SceneManifest::default());
        backend.clear_events();
        (orrery, backend)
    }

    #[test]
    fn quit_event_stops_the_loop() {
        let (mut orrery, mut backend) = orrery();
        let mut input = InputQueue::new();
        assert!(!orrery.should_quit());
        input.push(InputEvent::Quit);
        orrery.frame(0.016, &mut input, &mut backend);
        assert!(orrery.should_quit());
    }

    #[test]
    fn toggle_event_reaches_the_composer() {
        let (mut orrery, mut backend) = orrery();
        let mut input = InputQueue::new();
        input.push(InputEvent::Toggle { layer: Layer::Rings });
        orrery.frame(0.016, &mut input, &mut backend);
        assert!(!orrery.composer.toggles.rings);
    }

    #[test]
    fn pause_freezes_scene_positions() {
        let (mut orrery, mut backend) = orrery();
        let mut input = InputQueue::new();
        input.push(InputEvent::TogglePause);
        orrery.frame(0.016, &mut input, &mut backend);

        let frozen_t = orrery.clock.sim_time();
        let earth_before = orrery.composer.bodies[3].position(frozen_t);

        // a long wall-clock gap while paused moves nothing
        for _ in 0..100 {
            orrery.frame(0.25, &mut InputQueue::new(), &mut backend);
        }
        assert_eq!(orrery.clock.sim_time(), frozen_t);
        let earth_after = orrery.composer.bodies[3].position(orrery.clock.sim_time());
        assert_eq!(earth_before, earth_after);
        // wall clock kept running regardless
        assert!(orrery.clock.wall_time() > 25.0);
    }

    #[test]
    fn focus_tracks_a_moving_body() {
        let (mut orrery, mut backend) = orrery();
        let mut input = InputQueue::new();
        input.push(InputEvent::Focus { body: 3 });
        orrery.frame(0.016, &mut input, &mut backend);
        assert_eq!(orrery.camera.focused_body(), Some(3));

        // after plenty of frames the camera sits near Earth
        for _ in 0..600 {
            orrery.frame(0.016, &mut InputQueue::new(), &mut backend);
        }
        let earth = orrery.composer.bodies[3].position(orrery.clock.sim_time());
        let dist = (orrery.camera.position - earth).length();
        assert!(dist < 30.0, "camera {dist} units from focus target");
    }

    #[test]
    fn out_of_range_focus_is_ignored() {
        let (mut orrery, mut backend) = orrery();
        let mut input = InputQueue::new();
        input.push(InputEvent::Focus { body: 99 });
        orrery.frame(0.016, &mut input, &mut backend);
        assert_eq!(orrery.camera.focused_body(), None);
    }

    #[test]
    fn time_scale_event_adjusts_clock() {
        let (mut orrery, mut backend) = orrery();
        let mut input = InputQueue::new();
        input.push(InputEvent::TimeScale { delta: 1.5 });
        orrery.frame(0.016, &mut input, &mut backend);
        assert!((orrery.clock.time_scale() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn shutdown_releases_everything() {
        let (mut orrery, mut backend) = orrery();
        orrery.shutdown(&mut backend);
        assert_eq!(backend.destroyed_meshes.len(), backend.created_mesh_count());
        assert_eq!(
            backend.destroyed_textures.len(),
            backend.created_texture_count()
        );
        assert_eq!(
            backend.destroyed_programs.len(),
            backend.created_program_count()
        );
    }
}
