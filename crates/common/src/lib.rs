//! Shared types and deterministic randomness for the Ashfield crates.
//!
//! # Invariants
//! - A seed is derived once per run and never mutated.
//! - Every consumer owns its own [`RandomStream`]; streams are never shared.

pub mod rng;
pub mod types;

pub use rng::{RandomStream, Seed, seed_from_str};
pub use types::{Pose, RenderHandle, planar_distance};
