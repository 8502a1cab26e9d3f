//! Simulation: the per-frame loop over one generated town.
//!
//! # Invariants
//! - Everything here runs synchronously inside [`Session::step`]; nothing suspends.
//! - The agent draws only from its own stream; the layout stream is never touched.
//! - `danger`, `anger` and tension stay within `[0, 1]`.

pub mod clock;
pub mod config;
pub mod nav;
pub mod session;
pub mod stalker;
pub mod tension;

pub use clock::{ClockConfig, DEFAULT_PROFILE_WINDOW, FrameClock, StepProfile, StepSection};
pub use config::{ConfigError, GameConfig};
pub use nav::{NavConfig, NavigationController};
pub use session::{FrameInput, Outcome, Session, SessionConfig, SessionEvent, TickReport};
pub use stalker::{AGENT_STREAM, AgentEvent, AgentPhase, FAR_SENTINEL, StalkerAgent, StalkerConfig};
pub use tension::{TensionAggregator, TensionConfig};
