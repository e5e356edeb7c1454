//! Refresh, briefing and chat workflows.
//!
//! `PulseService` glues the [`Workspace`] to an [`IntelProvider`]:
//!
//! ```text
//!   topic ──► update_prompt ──► provider.search ──► parse ──► record_update ──► store
//!   topics ─► briefing_prompt ─► provider.generate ─────────► set_briefing ───► store
//!   topic ──► chat_instruction + history ──► provider.chat ──► transcript (memory only)
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::IntelProvider;
use crate::error::{Error, Result};
use crate::prompt::{self, PromptStyle};
use crate::store::Workspace;
use crate::types::{Briefing, EventItem, Message, Role, now_millis};

/// Briefing text used when the model returns nothing.
pub const EMPTY_BRIEFING_TEXT: &str = "Briefing pending.";

/// Chat reply used when the model returns nothing.
pub const EMPTY_CHAT_TEXT: &str = "Analyzing...";

/// Model message appended to a transcript when a chat call fails.
pub const CHAT_UNAVAILABLE_TEXT: &str = "The chat service is unavailable, please try again later.";

/// Outcome of refreshing every topic.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<RefreshedTopic>,
    pub failed: Vec<FailedRefresh>,
}

#[derive(Debug, Clone)]
pub struct RefreshedTopic {
    pub topic_id: String,
    pub title: String,
    pub event: EventItem,
}

#[derive(Debug)]
pub struct FailedRefresh {
    pub topic_id: String,
    pub title: String,
    pub error: Error,
}

impl RefreshReport {
    pub fn total(&self) -> usize {
        self.refreshed.len() + self.failed.len()
    }
}

/// In-memory chat with one topic.
///
/// The transcript is never persisted. Failed exchanges stay visible in the
/// transcript but are not sent back to the model as context.
#[derive(Debug, Clone)]
pub struct ChatSession {
    topic_id: String,
    transcript: Vec<Message>,
    context: Vec<Message>,
}

impl ChatSession {
    pub fn new(topic_id: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            transcript: Vec::new(),
            context: Vec::new(),
        }
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }
}

/// A model turn appended by [`PulseService::chat`].
#[derive(Debug)]
pub struct ChatReply {
    pub message: Message,
    /// Set when the provider failed and `message` is the fallback text
    pub error: Option<Error>,
}

impl ChatReply {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct PulseService<P: IntelProvider> {
    workspace: Workspace,
    provider: P,
    style: PromptStyle,
}

impl<P: IntelProvider> PulseService<P> {
    pub fn new(workspace: Workspace, provider: P, style: PromptStyle) -> Self {
        Self {
            workspace,
            provider,
            style,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Refresh
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the latest developments for one topic and append them as an event.
    ///
    /// Direct children are passed to the model as focus points. On provider
    /// failure the topic is left unchanged.
    pub async fn refresh_topic(&mut self, topic_id: &str) -> Result<EventItem> {
        self.workspace.reload()?;
        let request = {
            let tree = self.workspace.tree();
            let topic = tree
                .get(topic_id)
                .ok_or_else(|| Error::TopicNotFound(topic_id.to_string()))?;
            let subtopics = tree.children(topic_id);
            prompt::update_prompt(topic, &subtopics, &self.style)
        };
        debug!("Refreshing {} ({} prompt chars)", topic_id, request.len());

        let grounded = self.provider.search(&request).await?;
        let update = prompt::into_update(&grounded.text, grounded.sources);
        let event = self.workspace.apply_update(topic_id, update, now_millis())?;

        info!("Recorded event {} for topic {}", event.id, topic_id);
        Ok(event)
    }

    /// Refresh every topic in order, collecting failures instead of stopping.
    pub async fn refresh_all(&mut self) -> RefreshReport {
        if let Err(e) = self.workspace.reload() {
            warn!("Could not reload topics before refresh pass: {}", e);
        }
        let targets: Vec<(String, String)> = self
            .workspace
            .tree()
            .topics()
            .iter()
            .map(|t| (t.id.clone(), t.title.clone()))
            .collect();

        let mut report = RefreshReport::default();
        for (topic_id, title) in targets {
            match self.refresh_topic(&topic_id).await {
                Ok(event) => report.refreshed.push(RefreshedTopic {
                    topic_id,
                    title,
                    event,
                }),
                Err(error) => {
                    warn!("Refresh failed for {}: {}", title, error);
                    report.failed.push(FailedRefresh {
                        topic_id,
                        title,
                        error,
                    });
                }
            }
        }
        report
    }

    /// Refresh all topics every `period` until `shutdown` resolves.
    ///
    /// The first pass runs immediately. `on_report` sees each completed
    /// pass's result. A pass still running at shutdown is abandoned; topics it
    /// already refreshed stay saved.
    pub async fn watch<F, S>(&mut self, period: Duration, shutdown: S, mut on_report: F)
    where
        F: FnMut(&RefreshReport),
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Watch stopped");
                    break;
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("Watch stopped during a refresh pass");
                            break;
                        }
                        report = self.refresh_all() => on_report(&report),
                    }
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Briefing
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate and store a briefing across every topic.
    ///
    /// The previous briefing is kept if generation fails.
    pub async fn generate_briefing(&mut self) -> Result<Briefing> {
        self.workspace.reload()?;
        let tree = self.workspace.tree();
        if tree.is_empty() {
            return Err(Error::NothingToBrief);
        }
        let request = prompt::briefing_prompt(tree.topics(), &self.style);
        let topic_ids = tree.ids();

        let text = self.provider.generate(&request).await?;
        let content = if text.trim().is_empty() {
            EMPTY_BRIEFING_TEXT.to_string()
        } else {
            text
        };

        let briefing = Briefing {
            id: Uuid::new_v4().to_string(),
            timestamp: now_millis(),
            content,
            topic_ids,
        };
        self.workspace.set_briefing(briefing.clone())?;
        info!("Generated briefing {} over {} topic(s)", briefing.id, briefing.topic_ids.len());
        Ok(briefing)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask a question about the session's topic.
    ///
    /// Topics are reloaded and the instruction is rebuilt from the topic's
    /// current events on every turn, so refreshes made mid-conversation
    /// (here or in another process) are visible to the model.
    /// Provider failures don't return `Err`: the fallback text is appended
    /// and the error travels in the reply.
    pub async fn chat(&mut self, session: &mut ChatSession, query: &str) -> Result<ChatReply> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }
        self.workspace.reload()?;

        let instruction = {
            let topic = self
                .workspace
                .tree()
                .get(&session.topic_id)
                .ok_or_else(|| Error::TopicNotFound(session.topic_id.clone()))?;
            prompt::chat_instruction(topic, &self.style)
        };

        let question = Message::user(query);
        session.transcript.push(question.clone());

        match self
            .provider
            .chat(&instruction, &session.context, query)
            .await
        {
            Ok(text) => {
                let text = if text.trim().is_empty() {
                    EMPTY_CHAT_TEXT.to_string()
                } else {
                    text
                };
                let answer = Message::model(text);
                session.context.push(question);
                session.context.push(answer.clone());
                session.transcript.push(answer.clone());
                Ok(ChatReply {
                    message: answer,
                    error: None,
                })
            }
            Err(error) => {
                warn!("Chat failed for topic {}: {}", session.topic_id, error);
                let fallback = Message::model(CHAT_UNAVAILABLE_TEXT);
                session.transcript.push(fallback.clone());
                Ok(ChatReply {
                    message: fallback,
                    error: Some(error),
                })
            }
        }
    }
}

/// Count model turns in a transcript.
pub fn model_turns(transcript: &[Message]) -> usize {
    transcript.iter().filter(|m| m.role == Role::Model).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::{Call, ScriptedProvider};
    use crate::store::Store;
    use crate::types::NewTopic;
    use chrono::FixedOffset;

    fn style() -> PromptStyle {
        PromptStyle {
            language: "English".into(),
            offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn new_topic(title: &str, parent: Option<&str>) -> NewTopic {
        NewTopic {
            title: title.into(),
            description: format!("{} desc", title),
            category: None,
            parent_id: parent.map(str::to_string),
        }
    }

    fn service(provider: ScriptedProvider) -> PulseService<ScriptedProvider> {
        let workspace = Workspace::load(Store::open_in_memory().unwrap()).unwrap();
        PulseService::new(workspace, provider, style())
    }

    fn add(svc: &mut PulseService<ScriptedProvider>, title: &str, parent: Option<&str>) -> String {
        svc.workspace_mut()
            .edit(|tree| tree.add_topic(new_topic(title, parent)))
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_refresh_topic_records_event_and_sources() {
        let provider = ScriptedProvider::new().grounded(
            "<p>Big news</p>[RELEVANT_SITES: https://site.example, junk]",
            &["https://ground.example"],
        );
        let mut svc = service(provider);
        let parent = add(&mut svc, "Chips", None);
        add(&mut svc, "HBM", Some(&parent));

        let event = svc.refresh_topic(&parent).await.unwrap();

        assert_eq!(event.content, "<p>Big news</p>");
        assert_eq!(event.source_urls, vec!["https://ground.example".to_string()]);
        let topic = svc.workspace().tree().get(&parent).unwrap();
        assert_eq!(topic.events.len(), 1);
        assert!(topic.last_updated > 0);
        assert_eq!(topic.relevant_sources, vec!["https://site.example".to_string()]);

        match &svc.provider().calls()[0] {
            Call::Search(prompt) => {
                assert!(prompt.contains("Topic: Chips"));
                assert!(prompt.contains("related to them: HBM."));
                assert!(prompt.contains("search across all time"));
            }
            other => panic!("unexpected call {:?}", other),
        }

        let stored = svc.workspace().store().load_topics().unwrap().topics;
        assert_eq!(stored[0].events.len(), 1);
    }

    #[tokio::test]
    async fn test_second_refresh_uses_time_window_and_known_sources() {
        let provider = ScriptedProvider::new()
            .reply("first [RELEVANT_SITES: https://a.example]")
            .reply("second");
        let mut svc = service(provider);
        let id = add(&mut svc, "Fusion", None);

        svc.refresh_topic(&id).await.unwrap();
        svc.refresh_topic(&id).await.unwrap();

        let calls = svc.provider().calls();
        let Call::Search(second) = &calls[1] else {
            panic!("expected search");
        };
        assert!(second.contains("latest developments since"));
        assert!(second.contains("these sites already known to be highly relevant: https://a.example."));
        assert_eq!(svc.workspace().tree().get(&id).unwrap().events.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_topic_unchanged() {
        let mut svc = service(ScriptedProvider::new().fail("boom"));
        let id = add(&mut svc, "Fusion", None);
        let before = svc.workspace().tree().get(&id).unwrap().clone();

        let result = svc.refresh_topic(&id).await;

        assert!(matches!(result, Err(Error::Provider { status: 503, .. })));
        assert_eq!(svc.workspace().tree().get(&id).unwrap(), &before);
        assert!(matches!(
            svc.refresh_topic("missing").await,
            Err(Error::TopicNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_all_continues_past_failures() {
        let provider = ScriptedProvider::new().fail("down").reply("ok");
        let mut svc = service(provider);
        add(&mut svc, "A", None);
        let b = add(&mut svc, "B", None);

        let report = svc.refresh_all().await;

        assert_eq!(report.total(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].title, "A");
        assert_eq!(report.refreshed.len(), 1);
        assert_eq!(report.refreshed[0].topic_id, b);
    }

    #[tokio::test]
    async fn test_briefing_requires_topics() {
        let mut svc = service(ScriptedProvider::new());
        assert!(matches!(
            svc.generate_briefing().await,
            Err(Error::NothingToBrief)
        ));
        assert!(svc.provider().calls().is_empty());
    }

    #[tokio::test]
    async fn test_briefing_is_stored_with_all_topic_ids() {
        let mut svc = service(ScriptedProvider::new().reply("   ").reply("<h3>Week</h3>").fail("x"));
        let a = add(&mut svc, "A", None);
        let b = add(&mut svc, "B", Some(&a));

        let first = svc.generate_briefing().await.unwrap();
        assert_eq!(first.content, EMPTY_BRIEFING_TEXT);
        assert_eq!(first.topic_ids, vec![a, b]);

        let second = svc.generate_briefing().await.unwrap();
        assert_eq!(second.content, "<h3>Week</h3>");

        assert!(svc.generate_briefing().await.is_err());
        assert_eq!(svc.workspace().briefing(), Some(&second));
        assert_eq!(svc.workspace().store().load_briefing().unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_chat_carries_successful_history_only() {
        let provider = ScriptedProvider::new()
            .reply("<p>answer one</p>")
            .fail("overloaded")
            .reply("");
        let mut svc = service(provider);
        let id = add(&mut svc, "Chips", None);
        let mut session = ChatSession::new(&id);

        let first = svc.chat(&mut session, "What happened?").await.unwrap();
        assert!(first.is_ok());
        assert_eq!(first.message.content, "<p>answer one</p>");

        let second = svc.chat(&mut session, "And then?").await.unwrap();
        assert!(!second.is_ok());
        assert_eq!(second.message.content, CHAT_UNAVAILABLE_TEXT);

        let third = svc.chat(&mut session, "Summarise").await.unwrap();
        assert_eq!(third.message.content, EMPTY_CHAT_TEXT);

        assert_eq!(session.transcript().len(), 6);
        assert_eq!(model_turns(session.transcript()), 3);

        let calls = svc.provider().calls();
        let Call::Chat { instruction, history, message } = &calls[2] else {
            panic!("expected chat");
        };
        assert!(instruction.contains("The database is empty"));
        assert_eq!(message, "Summarise");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "What happened?");
        assert_eq!(history[1].role, Role::Model);
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_and_unknown_topic() {
        let mut svc = service(ScriptedProvider::new());
        let id = add(&mut svc, "Chips", None);

        let mut session = ChatSession::new(&id);
        assert!(matches!(
            svc.chat(&mut session, "   ").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(session.transcript().is_empty());

        let mut orphan = ChatSession::new("gone");
        assert!(matches!(
            svc.chat(&mut orphan, "hi").await,
            Err(Error::TopicNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_runs_until_shutdown() {
        let mut svc = service(ScriptedProvider::new().reply("one").reply("two").reply("three"));
        add(&mut svc, "A", None);

        let mut passes = 0;
        svc.watch(
            Duration::from_secs(60),
            tokio::time::sleep(Duration::from_secs(150)),
            |report| {
                assert_eq!(report.refreshed.len(), 1);
                passes += 1;
            },
        )
        .await;

        assert_eq!(passes, 3);
        assert_eq!(svc.workspace().tree().topics()[0].events.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_shutdown_interrupts_running_pass() {
        let provider = ScriptedProvider::new()
            .reply("slow")
            .delayed(Duration::from_secs(1000));
        let mut svc = service(provider);
        let id = add(&mut svc, "A", None);
        let started = tokio::time::Instant::now();

        let mut passes = 0;
        svc.watch(
            Duration::from_secs(60),
            tokio::time::sleep(Duration::from_secs(10)),
            |_| passes += 1,
        )
        .await;

        assert_eq!(passes, 0);
        assert!(started.elapsed() < Duration::from_secs(1000));
        assert_eq!(svc.provider().calls().len(), 1);
        assert!(svc.workspace().tree().get(&id).unwrap().events.is_empty());
    }
}
