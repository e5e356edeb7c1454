//! AI provider interface.
//!
//! The provider is an opaque collaborator: it takes a prompt and returns text,
//! plus grounding URLs when the call used web search. Different backends
//! (Gemini over HTTP, scripted mocks in tests) implement [`IntelProvider`].

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::*;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Message;

/// Text from a search-grounded generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundedText {
    pub text: String,
    /// URLs of the web pages the answer was grounded on
    pub sources: Vec<String>,
}

/// Generative AI backend used for updates, briefings and chat.
///
/// Each method is a single attempt. Failures are returned to the caller
/// without retry.
#[async_trait]
pub trait IntelProvider: Send + Sync {
    /// Generate with the web-search tool enabled.
    async fn search(&self, prompt: &str) -> Result<GroundedText>;

    /// Plain generation without tools.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Continue a conversation under `system_instruction`, with search enabled.
    ///
    /// `history` holds the earlier turns, oldest first. `message` is the new
    /// user turn.
    async fn chat(
        &self,
        system_instruction: &str,
        history: &[Message],
        message: &str,
    ) -> Result<String>;
}
