//! Input: the actions an input collaborator can produce, and the locomotion
//! model turning a planar intent plus facing into a world displacement.
//!
//! # Invariants
//! - The simulation consumes [`Action`]s and [`MoveIntent`]s, never raw key events.
//! - Locomotion never looks at collision; navigation resolves its output.

pub mod action;
pub mod locomotion;

pub use action::{Action, MoveIntent};
pub use locomotion::{Locomotion, LocomotionConfig};
