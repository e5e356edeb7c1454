//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GroundedText, IntelProvider};
use crate::error::{Error, Result};
use crate::types::Message;

/// A recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Generate(String),
    Chat {
        instruction: String,
        history: Vec<Message>,
        message: String,
    },
}

/// Replays queued replies in order and records every call.
///
/// `Err` entries are turned into provider errors. An exhausted queue fails.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<std::result::Result<GroundedText, String>>>,
    calls: Mutex<Vec<Call>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.grounded(text, &[])
    }

    pub fn grounded(self, text: &str, sources: &[&str]) -> Self {
        self.replies.lock().unwrap().push_back(Ok(GroundedText {
            text: text.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }));
        self
    }

    pub fn fail(self, reason: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(reason.to_string()));
        self
    }

    /// Make every call take `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn next(&self, call: Call) -> Result<GroundedText> {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(Error::provider(503, reason)),
            None => Err(Error::Other("no scripted reply left".into())),
        }
    }
}

#[async_trait]
impl IntelProvider for ScriptedProvider {
    async fn search(&self, prompt: &str) -> Result<GroundedText> {
        self.next(Call::Search(prompt.to_string())).await
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.next(Call::Generate(prompt.to_string())).await.map(|r| r.text)
    }

    async fn chat(
        &self,
        system_instruction: &str,
        history: &[Message],
        message: &str,
    ) -> Result<String> {
        self.next(Call::Chat {
            instruction: system_instruction.to_string(),
            history: history.to_vec(),
            message: message.to_string(),
        })
        .await
        .map(|r| r.text)
    }
}
