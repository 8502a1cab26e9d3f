use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::action::MoveIntent;

/// Walking model tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub acceleration: f32,
    /// Fraction of velocity shed per second.
    pub drag: f32,
    /// Breath drained per second while sprinting and moving.
    pub breath_drain: f32,
    /// Breath recovered per second otherwise.
    pub breath_regen: f32,
    /// Sprinting needs more breath than this.
    pub sprint_floor: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.2,
            run_speed: 5.1,
            acceleration: 18.0,
            drag: 8.0,
            breath_drain: 0.28,
            breath_regen: 0.18,
            sprint_floor: 0.08,
        }
    }
}

/// Player velocity and stamina, integrated once per frame.
#[derive(Debug, Clone)]
pub struct Locomotion {
    config: LocomotionConfig,
    velocity: Vec2,
    breath: f32,
    running: bool,
}

impl Locomotion {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            velocity: Vec2::ZERO,
            breath: 1.0,
            running: false,
        }
    }

    /// Planar velocity (x, z).
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Stamina in [0, 1].
    pub fn breath(&self) -> f32 {
        self.breath
    }

    /// Whether the last update was a sprint.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Integrate one frame and return the world-space displacement.
    ///
    /// `yaw` 0 faces -Z. The returned vector has no height component.
    pub fn update(&mut self, dt: f32, intent: MoveIntent, yaw: f32) -> Vec3 {
        let cfg = &self.config;
        let dir = intent.normalized();
        let moving = dir.length_squared() > 0.0;
        let wants_run = intent.sprint && self.breath > cfg.sprint_floor;

        if wants_run && moving {
            self.breath = (self.breath - dt * cfg.breath_drain).clamp(0.0, 1.0);
        } else {
            self.breath = (self.breath + dt * cfg.breath_regen).clamp(0.0, 1.0);
        }
        if wants_run != self.running {
            tracing::trace!(running = wants_run, breath = self.breath, "gait changed");
        }
        self.running = wants_run;

        let facing = if yaw.is_finite() { yaw } else { 0.0 };
        let rot = Quat::from_rotation_y(facing);
        let world = rot * Vec3::new(dir.x, 0.0, -dir.y);
        self.velocity += Vec2::new(world.x, world.z) * cfg.acceleration * dt;
        self.velocity -= self.velocity * (cfg.drag * dt).min(1.0);

        let max_speed = if wants_run { cfg.run_speed } else { cfg.walk_speed };
        let speed = self.velocity.length();
        if speed > max_speed {
            self.velocity *= max_speed / speed;
        }

        Vec3::new(self.velocity.x * dt, 0.0, self.velocity.y * dt)
    }
}

impl Default for Locomotion {
    fn default() -> Self {
        Self::new(LocomotionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(loco: &mut Locomotion, intent: MoveIntent, yaw: f32, seconds: f32) -> Vec3 {
        let mut total = Vec3::ZERO;
        let dt = 1.0 / 60.0;
        let steps = (seconds / dt) as usize;
        for _ in 0..steps {
            total += loco.update(dt, intent, yaw);
        }
        total
    }

    #[test]
    fn forward_at_zero_yaw_moves_negative_z() {
        let mut loco = Locomotion::default();
        let d = walk(&mut loco, MoveIntent::new(0.0, 1.0), 0.0, 1.0);
        assert!(d.z < -1.0);
        assert!(d.x.abs() < 1e-4);
        assert_eq!(d.y, 0.0);
    }

    #[test]
    fn strafe_right_moves_positive_x() {
        let mut loco = Locomotion::default();
        let d = walk(&mut loco, MoveIntent::new(1.0, 0.0), 0.0, 1.0);
        assert!(d.x > 1.0);
    }

    #[test]
    fn walking_speed_is_capped() {
        let mut loco = Locomotion::default();
        walk(&mut loco, MoveIntent::new(0.0, 1.0), 0.0, 3.0);
        assert!(loco.velocity().length() <= 3.2 + 1e-4);
    }

    #[test]
    fn sprint_drains_and_idle_regenerates() {
        let mut loco = Locomotion::default();
        walk(&mut loco, MoveIntent::new(0.0, 1.0).sprinting(), 0.0, 2.0);
        let drained = loco.breath();
        assert!(drained < 0.5);
        assert!(loco.is_running());
        walk(&mut loco, MoveIntent::idle(), 0.0, 1.0);
        assert!(loco.breath() > drained);
    }

    #[test]
    fn sustained_sprint_bottoms_out_at_the_floor() {
        let mut loco = Locomotion::default();
        walk(&mut loco, MoveIntent::new(0.0, 1.0).sprinting(), 0.0, 6.0);
        assert!(loco.breath() > 0.05 && loco.breath() < 0.1, "breath {}", loco.breath());
    }

    #[test]
    fn idle_player_slows_to_a_stop() {
        let mut loco = Locomotion::default();
        walk(&mut loco, MoveIntent::new(0.0, 1.0), 0.0, 1.0);
        walk(&mut loco, MoveIntent::idle(), 0.0, 2.0);
        assert!(loco.velocity().length() < 0.01);
    }
}
