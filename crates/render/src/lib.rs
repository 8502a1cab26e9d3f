//! Rendering Adapter: what render and presentation collaborators may see.
//!
//! # Invariants
//! - Collaborators receive descriptors, never the session itself.
//! - Nothing here mutates simulation state; the core issues no draw calls.
//! - Render handles are the only link back to logical entities.

mod presenter;
mod renderer;
mod view;

pub use presenter::{EventLog, Presenter};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use view::{AgentView, AnchorDescriptor, FrameView, SolidDescriptor, SolidShape};
