//! Command implementations for pulse CLI.
//!
//! Each submodule implements the logic for a command group.

pub mod briefing;
pub mod chat;
pub mod clear;
pub mod config;
pub mod doctor;
pub mod refresh;
pub mod topic;
pub mod watch;
