use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Static collision shape registered by the layout builder.
///
/// Immutable after generation. Only the planar footprint takes part in
/// depenetration; heights are carried for the render collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Solid {
    /// Oriented box rotated by `yaw` about +Y.
    Box {
        center: Vec3,
        half_extents: Vec3,
        yaw: f32,
    },
    /// Upright cylinder standing on the ground.
    Cylinder {
        center: Vec3,
        radius: f32,
        height: f32,
    },
}

impl Solid {
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Box { center, .. } | Self::Cylinder { center, .. } => *center,
        }
    }

    pub fn yaw(&self) -> f32 {
        match self {
            Self::Box { yaw, .. } => *yaw,
            Self::Cylinder { .. } => 0.0,
        }
    }

    /// Rotation taking local box coordinates to world coordinates.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw())
    }

    /// Radius of the smallest planar circle around `center` enclosing the footprint.
    pub fn planar_bound(&self) -> f32 {
        match self {
            Self::Box { half_extents, .. } => {
                (half_extents.x * half_extents.x + half_extents.z * half_extents.z).sqrt()
            }
            Self::Cylinder { radius, .. } => *radius,
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Self::Box { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylinder_has_no_yaw() {
        let c = Solid::Cylinder {
            center: Vec3::new(1.0, 0.0, 2.0),
            radius: 0.5,
            height: 3.0,
        };
        assert_eq!(c.yaw(), 0.0);
        assert_eq!(c.center(), Vec3::new(1.0, 0.0, 2.0));
        assert!(!c.is_box());
    }

    #[test]
    fn box_bound_covers_corners() {
        let b = Solid::Box {
            center: Vec3::ZERO,
            half_extents: Vec3::new(3.0, 1.0, 4.0),
            yaw: 0.3,
        };
        assert!((b.planar_bound() - 5.0).abs() < 1e-6);
    }
}
