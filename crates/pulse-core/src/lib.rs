//! pulse-core - Core library for EventPulse
//!
//! This crate provides everything the pulse CLI needs besides presentation:
//!
//! - **types**: Topics, events, briefings and chat messages
//! - **topic**: Topic tree (parent pointers) and event accumulation
//! - **store**: Versioned local state with migration on read
//! - **prompt**: Prompt and context construction for the AI calls
//! - **ai**: AI provider trait and the Gemini client
//! - **service**: Refresh, briefing, watch and chat workflows

pub mod ai;
pub mod error;
pub mod prompt;
pub mod service;
pub mod store;
pub mod topic;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use service::{ChatSession, PulseService};
pub use store::{Store, Workspace};
pub use topic::TopicTree;
