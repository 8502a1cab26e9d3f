use ashfield_common::{Pose, Seed, planar_distance};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::solid::Solid;

/// Square ground plane centered on the town origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundExtent {
    pub half_size: f32,
}

/// A flat road strip, decorative only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub center: Vec3,
    pub width: f32,
    pub length: f32,
    pub yaw: f32,
}

/// A building footprint plus the decorative details the render collaborator draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    /// Always a [`Solid::Box`]; the same value appears in [`WorldLayout::solids`].
    pub footprint: Solid,
    pub windows: u32,
}

/// One tree of the forest ring. Only some trees carry trunk collision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreePlacement {
    pub position: Vec3,
    pub trunk_height: f32,
    pub crown_radius: f32,
    pub crown_height: f32,
    pub has_collider: bool,
}

/// Streetlamp position. Lamps have no collision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LampPlacement {
    pub position: Vec3,
}

/// What an interactable anchor means to the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    Clue,
    Sign,
    Terminal,
    Door,
    Beacon,
}

/// An interactable point of interest. `payload` is opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub position: Vec3,
    pub kind: AnchorKind,
    pub payload: String,
}

/// Goal region; entering it ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeepZone {
    pub center: Vec3,
    pub radius: f32,
}

impl DeepZone {
    pub fn contains(&self, p: Vec3) -> bool {
        planar_distance(self.center, p) < self.radius
    }
}

/// Immutable result of one layout generation.
///
/// Exactly one layout exists per run; nothing mutates it after the builder
/// returns. Collision queries borrow [`WorldLayout::solids`] directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldLayout {
    pub(crate) seed: Seed,
    pub(crate) ground: GroundExtent,
    pub(crate) bounds_radius: f32,
    pub(crate) roads: Vec<RoadSegment>,
    pub(crate) buildings: Vec<BuildingPlacement>,
    pub(crate) forest: Vec<TreePlacement>,
    pub(crate) lamps: Vec<LampPlacement>,
    pub(crate) anchors: Vec<Anchor>,
    pub(crate) spawn: Pose,
    pub(crate) deep_zone: DeepZone,
    pub(crate) solids: Vec<Solid>,
}

impl WorldLayout {
    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn ground(&self) -> GroundExtent {
        self.ground
    }

    /// Radius of the circular town boundary players and the agent are confined to.
    pub fn bounds_radius(&self) -> f32 {
        self.bounds_radius
    }

    pub fn roads(&self) -> &[RoadSegment] {
        &self.roads
    }

    pub fn buildings(&self) -> &[BuildingPlacement] {
        &self.buildings
    }

    pub fn forest(&self) -> &[TreePlacement] {
        &self.forest
    }

    pub fn lamps(&self) -> &[LampPlacement] {
        &self.lamps
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn anchor(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    pub fn spawn_point(&self) -> Pose {
        self.spawn
    }

    pub fn deep_zone(&self) -> DeepZone {
        self.deep_zone
    }

    /// All static solids in registration order.
    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    /// Project `p` radially back inside the town boundary. Height is untouched.
    pub fn confine(&self, p: Vec3) -> Vec3 {
        confine_to_radius(p, self.bounds_radius)
    }

    /// Anchors of one kind, with their indices.
    pub fn anchors_of(&self, kind: AnchorKind) -> impl Iterator<Item = (usize, &Anchor)> {
        self.anchors
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.kind == kind)
    }
}

/// Points this close outside the boundary count as on it, so confining a
/// confined point is a no-op.
const BOUNDARY_SLOP: f32 = 1e-3;

pub(crate) fn confine_to_radius(mut p: Vec3, radius: f32) -> Vec3 {
    let len = (p.x * p.x + p.z * p.z).sqrt();
    if len > radius + BOUNDARY_SLOP && len > 0.0 {
        let s = radius / len;
        p.x *= s;
        p.z *= s;
    }
    p
}
