use ashfield_common::RenderHandle;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Planar movement request for one frame.
///
/// `planar.x` strafes right, `planar.y` walks forward. Vectors longer than 1
/// are normalized so diagonals are not faster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveIntent {
    pub planar: Vec2,
    pub sprint: bool,
}

impl MoveIntent {
    pub fn new(strafe: f32, forward: f32) -> Self {
        Self {
            planar: Vec2::new(strafe, forward),
            sprint: false,
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn sprinting(mut self) -> Self {
        self.sprint = true;
        self
    }

    /// Direction with length at most 1; non-finite input counts as idle.
    pub fn normalized(&self) -> Vec2 {
        if !self.planar.is_finite() {
            return Vec2::ZERO;
        }
        let len = self.planar.length();
        if len > 1.0 { self.planar / len } else { self.planar }
    }

    pub fn is_moving(&self) -> bool {
        self.normalized().length_squared() > 0.0
    }
}

/// A discrete request the input collaborator makes in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Use the nearest anchor in reach.
    Interact,
    /// Use the anchor behind a render handle (e.g. the one under the crosshair).
    InteractWith(RenderHandle),
    /// No-op (used for input bindings that do nothing yet).
    Noop,
}
