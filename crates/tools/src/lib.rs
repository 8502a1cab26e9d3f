//! Developer tooling: layout inspector, clearance checks, agent summaries.
//!
//! # Invariants
//! - Tools only read; nothing here mutates a layout or a session.

mod inspector;

pub use inspector::{
    AgentInfo, ClearanceIssue, ClearanceReport, LayoutInspector, LayoutSummary,
};
