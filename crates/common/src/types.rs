use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Stable identifier a render collaborator attaches to its scene nodes.
///
/// Handles are allocated deterministically from layout order, so the same
/// seed always yields the same handle for the same logical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

/// A position plus a facing yaw (radians about +Y).
///
/// Yaw 0 looks down -Z, matching the render collaborator's camera convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub yaw: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Planar unit vector the pose is facing.
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::NEG_Z
    }
}

/// Distance between two points on the ground plane, ignoring height.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_default_faces_negative_z() {
        let p = Pose::default();
        assert_eq!(p.position, Vec3::ZERO);
        let f = p.forward();
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn quarter_turn_faces_negative_x() {
        let p = Pose::new(Vec3::ZERO, std::f32::consts::FRAC_PI_2);
        assert!((p.forward() - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 1.7, 0.0);
        let b = Vec3::new(3.0, 0.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn render_handles_order_by_value() {
        assert!(RenderHandle(1) < RenderHandle(2));
    }
}
