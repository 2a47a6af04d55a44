//! Free-fly / focus-tracking camera.
//!
//! Produces the view and projection matrices for the frame. In `Free` mode
//! the position integrates from directional input and the orientation from
//! pointer deltas; in `Focused` mode both are derived from the tracked
//! body's orbital position, with an optional exponential approach that never
//! overshoots.

use glam::{Mat4, Vec3};

/// Directional movement input (camera-relative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDir {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Camera behavior mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusMode {
    /// Position and orientation integrate from input.
    Free,
    /// Position derived from the tracked body; look input is ignored.
    Focused { body: usize, distance: f32 },
}

pub const FOV_MIN_DEG: f32 = 20.0;
pub const FOV_MAX_DEG: f32 = 80.0;
pub const FOCUS_DISTANCE_MIN: f32 = 5.0;
pub const FOCUS_DISTANCE_MAX: f32 = 100.0;

const PITCH_LIMIT_DEG: f32 = 89.0;
const LOOK_SENSITIVITY: f32 = 0.1;
const MOVE_SPEED: f32 = 20.0;
const DEFAULT_FOCUS_DISTANCE: f32 = 15.0;
/// Exponential approach rate for smoothed focus tracking.
const FOLLOW_RATE: f32 = 5.0;

pub struct Camera {
    pub position: Vec3,
    /// Unit look direction.
    pub front: Vec3,
    /// Unit up vector.
    pub up: Vec3,
    /// Vertical field of view, degrees.
    pub fov_deg: f32,
    pub focus: FocusMode,
    /// Exponential approach toward the focus target when true;
    /// instant snap when false.
    pub smoothing: bool,
    yaw_deg: f32,
    pitch_deg: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 60.0, 80.0),
            front: Vec3::new(0.0, -0.3, -1.0).normalize(),
            up: Vec3::Y,
            fov_deg: 60.0,
            focus: FocusMode::Free,
            smoothing: true,
            yaw_deg: -90.0,
            pitch_deg: -12.0,
        }
    }

    pub fn is_focused(&self) -> bool {
        matches!(self.focus, FocusMode::Focused { .. })
    }

    /// Body index currently tracked, if any.
    pub fn focused_body(&self) -> Option<usize> {
        match self.focus {
            FocusMode::Focused { body, .. } => Some(body),
            FocusMode::Free => None,
        }
    }

    /// Select a body to track. Re-selecting the tracked body releases back
    /// to free flight.
    pub fn focus_on(&mut self, body: usize) {
        match self.focus {
            FocusMode::Focused { body: current, .. } if current == body => {
                self.focus = FocusMode::Free;
            }
            _ => {
                self.focus = FocusMode::Focused {
                    body,
                    distance: DEFAULT_FOCUS_DISTANCE,
                };
            }
        }
    }

    pub fn release(&mut self) {
        self.focus = FocusMode::Free;
    }

    /// Integrate directional movement. Ignored while focused — the tracked
    /// body dictates the position.
    pub fn apply_move(&mut self, dir: MoveDir, dt: f32) {
        if self.is_focused() {
            return;
        }
        let step = MOVE_SPEED * dt;
        let right = self.front.cross(self.up).normalize();
        match dir {
            MoveDir::Forward => self.position += self.front * step,
            MoveDir::Backward => self.position -= self.front * step,
            MoveDir::Left => self.position -= right * step,
            MoveDir::Right => self.position += right * step,
            MoveDir::Up => self.position += self.up * step,
            MoveDir::Down => self.position -= self.up * step,
        }
    }

    /// Integrate pointer-delta look input. Ignored while focused.
    pub fn apply_look(&mut self, dx: f32, dy: f32) {
        if self.is_focused() {
            return;
        }
        self.yaw_deg += dx * LOOK_SENSITIVITY;
        self.pitch_deg = (self.pitch_deg + dy * LOOK_SENSITIVITY)
            .clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);

        let (yaw, pitch) = (self.yaw_deg.to_radians(), self.pitch_deg.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
    }

    /// Scroll input: adjusts field of view in free flight, focus distance
    /// while tracking. Both clamp independently.
    pub fn apply_scroll(&mut self, delta: f32) {
        match &mut self.focus {
            FocusMode::Focused { distance, .. } => {
                *distance = (*distance - delta).clamp(FOCUS_DISTANCE_MIN, FOCUS_DISTANCE_MAX);
            }
            FocusMode::Free => {
                self.fov_deg = (self.fov_deg - delta).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
            }
        }
    }

    /// Viewing offset from the tracked body at the given focus distance:
    /// behind and slightly above, so the orbit plane stays readable.
    fn focus_offset(distance: f32) -> Vec3 {
        Vec3::new(0.0, distance * 0.35, distance)
    }

    /// Per-frame update while focused: move toward the body's viewing
    /// offset and re-aim at the body. The exponential approach converges
    /// without ever overshooting. No-op in free flight.
    pub fn follow(&mut self, body_pos: Vec3, dt: f32) {
        let distance = match self.focus {
            FocusMode::Focused { distance, .. } => distance,
            FocusMode::Free => return,
        };
        let target = body_pos + Self::focus_offset(distance);
        if self.smoothing {
            let blend = (FOLLOW_RATE * dt).min(1.0);
            self.position += (target - self.position) * blend;
        } else {
            self.position = target;
        }
        let to_body = body_pos - self.position;
        if to_body.length_squared() > 1e-12 {
            self.front = to_body.normalize();
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), aspect, 0.1, 1000.0)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
