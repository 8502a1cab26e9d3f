use ashfield_kernel::CollisionIndex;
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Radius of the player's collision circle.
    pub player_radius: f32,
    /// Fixed camera height; the ground is flat.
    pub eye_height: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            player_radius: 0.4,
            eye_height: 1.7,
        }
    }
}

/// Turns desired displacements into resolved player positions.
///
/// There is no failure path: every step returns a valid position.
#[derive(Debug, Clone)]
pub struct NavigationController {
    config: NavConfig,
    position: Vec3,
}

impl NavigationController {
    pub fn new(config: NavConfig, start: Vec3) -> Self {
        let position = Vec3::new(start.x, config.eye_height, start.z);
        Self { config, position }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.config.player_radius
    }

    /// Apply `displacement` to the previous position and resolve the result.
    ///
    /// Standing still in a clear spot never moves the player.
    pub fn step(&mut self, displacement: Vec3, index: &CollisionIndex<'_>) -> Vec3 {
        if !displacement.is_finite() {
            tracing::debug!(?displacement, "dropping non-finite displacement");
            return self.position;
        }
        let mut candidate = self.position + displacement;
        candidate.y = self.config.eye_height;
        let candidate = index.confine(candidate);
        let radius = self.config.player_radius;
        let resolved = index.resolve(candidate, radius);
        // A clear position is never traded for an overlapping one.
        if index.is_clear(resolved, radius) || !index.is_clear(self.position, radius) {
            self.position = resolved;
        } else {
            tracing::debug!(x = resolved.x, z = resolved.z, "resolved step still overlaps, holding position");
        }
        self.position
    }
}
