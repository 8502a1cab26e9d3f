//! World Kernel: seeded town layout, static solids, depenetration.
//!
//! # Invariants
//! - Exactly one [`WorldLayout`] per run; it is never mutated after `build`.
//! - `build` is pure in (seed, theme text, config).
//! - [`CollisionIndex`] is a borrowed read-only view over the layout's solids.

pub mod builder;
pub mod collision;
pub mod layout;
pub mod registry;
pub mod solid;

pub use builder::{LayoutBuilder, LayoutConfig, PLACEHOLDER_MOTIF, Span, WORLD_STREAM};
pub use collision::CollisionIndex;
pub use layout::{
    Anchor, AnchorKind, BuildingPlacement, DeepZone, GroundExtent, LampPlacement, RoadSegment,
    TreePlacement, WorldLayout,
};
pub use registry::{EntityRegistry, LogicalEntity};
pub use solid::Solid;
