use crate::renderer::camera::MoveDir;

/// Optional scene layers that can be toggled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Orbits,
    Moons,
    Rings,
    Atmospheres,
    Asteroids,
    Dust,
    LensFlare,
}

/// Input event types the engine understands.
/// Generic — the windowing host maps raw keys/pointer motion onto these.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    /// Directional camera movement held this frame.
    Move { dir: MoveDir },
    /// Pointer delta for mouse-look (suppressed internally while focused).
    Look { dx: f32, dy: f32 },
    /// Scroll wheel: field of view in free flight, focus distance while
    /// tracking a body.
    Scroll { delta: f32 },
    /// Pause/resume the simulation clock.
    TogglePause,
    /// Nudge the time-scale multiplier.
    TimeScale { delta: f32 },
    /// Flip a layer's visibility.
    Toggle { layer: Layer },
    /// Focus the camera on a body by index (re-selecting releases).
    Focus { body: usize },
    /// Release camera focus explicitly.
    Release,
    /// Stop the frame loop.
    Quit,
}

/// A queue of input events.
/// The host writes events as it polls the window; the frame loop drains
/// them once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event (called by the windowing host).
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
