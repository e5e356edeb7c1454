//! Prompt and context construction for the AI provider.
//!
//! Every prompt asks for bare HTML (no Markdown fences) and ends with an
//! instruction to answer in the configured language.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Timelike};
use regex::Regex;

use crate::topic::recent_events;
use crate::types::{FetchedUpdate, Topic};

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "Chinese";

/// Events per topic included in a briefing.
pub const BRIEFING_EVENTS_PER_TOPIC: usize = 3;

/// Summary used when the model returns no text for an update.
pub const EMPTY_UPDATE_TEXT: &str = "No new updates found.";

static RELEVANT_SITES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[RELEVANT_SITES:\s*([^\]]+)\]").expect("valid regex"));

/// Language and clock used when rendering prompts.
#[derive(Debug, Clone)]
pub struct PromptStyle {
    pub language: String,
    /// Offset used to render timestamps
    pub offset: FixedOffset,
}

impl PromptStyle {
    /// Style using the machine's local UTC offset.
    pub fn local(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            offset: *Local::now().offset(),
        }
    }

    /// `YYYY/M/D HH:MM:SS`
    pub fn datetime(&self, millis: i64) -> String {
        match self.at(millis) {
            Some(dt) => format!(
                "{}/{}/{} {:02}:{:02}:{:02}",
                dt.year(),
                dt.month(),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            None => millis.to_string(),
        }
    }

    /// `YYYY/M/D`
    pub fn date(&self, millis: i64) -> String {
        match self.at(millis) {
            Some(dt) => format!("{}/{}/{}", dt.year(), dt.month(), dt.day()),
            None => millis.to_string(),
        }
    }

    fn at(&self, millis: i64) -> Option<DateTime<FixedOffset>> {
        self.offset.timestamp_millis_opt(millis).single()
    }

    fn answer_in(&self) -> String {
        format!("Answer in {}.", self.language)
    }
}

impl Default for PromptStyle {
    fn default() -> Self {
        Self::local(DEFAULT_LANGUAGE)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Topic updates
// ─────────────────────────────────────────────────────────────────────────────

/// Build the grounded-search prompt for refreshing `topic`.
pub fn update_prompt(topic: &Topic, subtopics: &[&Topic], style: &PromptStyle) -> String {
    let time_context = if topic.is_new() {
        "This is a new topic: search across all time and cover its origins, current state and every key milestone."
            .to_string()
    } else {
        format!(
            "Search for the latest developments since {}.",
            style.datetime(topic.last_updated)
        )
    };

    let source_context = if topic.relevant_sources.is_empty() {
        "While searching, identify and list 3-5 professional news sites or official sources that are highly relevant to this topic."
            .to_string()
    } else {
        format!(
            "Prioritise information from these sites already known to be highly relevant: {}.",
            topic.relevant_sources.join(", ")
        )
    };

    let subtopic_context = if subtopics.is_empty() {
        String::new()
    } else {
        let titles: Vec<&str> = subtopics.iter().map(|s| s.title.as_str()).collect();
        format!(
            "This topic has the following focus points; prioritise developments related to them: {}.",
            titles.join(", ")
        )
    };

    let requirements = [
        time_context,
        source_context,
        subtopic_context,
        "Your answer must be pure HTML. Use tags such as <h3>, <p>, <ul>, <li> and <strong>. Do not wrap it in Markdown code fences."
            .to_string(),
        "After the event summary, list the relevant websites you identified in the form [RELEVANT_SITES: url1, url2]."
            .to_string(),
    ];

    let numbered: Vec<String> = requirements
        .iter()
        .filter(|r| !r.is_empty())
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect();

    format!(
        "You are an intelligence expert.\nTopic: {}\nDescription: {}\n\nRequirements:\n{}\n\n{}",
        topic.title,
        topic.description,
        numbered.join("\n"),
        style.answer_in()
    )
}

/// Split a raw update response into its summary and the relevant-sites trailer.
///
/// Only the first trailer is consumed. Entries not starting with `http` are
/// dropped.
pub fn parse_update_response(raw: &str) -> (String, Vec<String>) {
    if raw.trim().is_empty() {
        return (EMPTY_UPDATE_TEXT.to_string(), Vec::new());
    }

    let Some(caps) = RELEVANT_SITES.captures(raw) else {
        return (raw.trim().to_string(), Vec::new());
    };

    let sites = caps[1]
        .split(',')
        .map(str::trim)
        .filter(|s| s.starts_with("http"))
        .map(str::to_string)
        .collect();

    let summary = RELEVANT_SITES.replace(raw, "").trim().to_string();
    (summary, sites)
}

/// Combine a raw grounded response into a [`FetchedUpdate`].
pub fn into_update(raw: &str, sources: Vec<String>) -> FetchedUpdate {
    let (summary, relevant_websites) = parse_update_response(raw);
    FetchedUpdate {
        summary,
        sources,
        relevant_websites,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Briefing
// ─────────────────────────────────────────────────────────────────────────────

/// Build the cross-topic briefing prompt from each topic's latest events.
pub fn briefing_prompt(topics: &[Topic], style: &PromptStyle) -> String {
    let summary = topics
        .iter()
        .map(|t| {
            let recent = recent_events(t, BRIEFING_EVENTS_PER_TOPIC)
                .iter()
                .map(|e| format!("[{}] {}", style.date(e.timestamp), e.content))
                .collect::<Vec<_>>()
                .join("<br>");
            format!(
                "Topic: {}<br>Background: {}<br>Recent entries:<br>{}",
                t.title, t.description, recent
            )
        })
        .collect::<Vec<_>>()
        .join("<hr>");

    format!(
        "You are a chief intelligence analyst. Based on the tracking data for the independent topics below, \
produce one consolidated HTML intelligence briefing.

Requirements:
1. Look for correlations and potential knock-on effects between different topics, including across domains.
2. Use the layout style of a premium weekly intelligence report.
3. Keep the tone professional, rigorous and insightful.
4. Do not use Markdown.

{}

Data to process:
{}",
        style.answer_in(),
        summary
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// Render a topic's events as a numbered transcript for the chat model.
pub fn event_database(topic: &Topic, style: &PromptStyle) -> String {
    if topic.events.is_empty() {
        return "(The database is empty: no event entries have been tracked yet.)".to_string();
    }

    topic
        .events
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            format!(
                "Entry #{} (recorded {})\nContent: {}",
                idx + 1,
                style.datetime(e.timestamp),
                e.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System instruction scoping a chat to one topic's event database.
pub fn chat_instruction(topic: &Topic, style: &PromptStyle) -> String {
    format!(
        "You are an in-depth analysis expert. The user is discussing the topic \"{}\" (description: {}) with you.

[INTELLIGENCE DATABASE - CRITICAL]
These are all the event entries the system has tracked and stored so far:
{}

[ANSWER RULES]
1. When the user mentions \"these entries\", \"the messages above\" or \"the tracked content\", they mean the [INTELLIGENCE DATABASE] above.
2. Compare how things changed between entries recorded at different times.
3. Use your external knowledge and Google Search to comment on, explain or forecast from these entries.
4. Answer in HTML (<h3>, <p>, <ul>, <li>, <span style=\"color:blue\"> and similar).
5. Never use Markdown code blocks.

{}",
        topic.title,
        topic.description,
        event_database(topic, style),
        style.answer_in()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_CATEGORY, EventItem};

    // 2024-03-05 06:07:08 UTC
    const T0: i64 = 1_709_618_828_000;

    fn utc() -> PromptStyle {
        PromptStyle {
            language: "English".into(),
            offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn topic(title: &str) -> Topic {
        Topic {
            id: title.to_lowercase(),
            title: title.into(),
            description: format!("{} description", title),
            category: DEFAULT_CATEGORY.into(),
            events: vec![],
            last_updated: 0,
            parent_id: None,
            relevant_sources: vec![],
        }
    }

    fn event(content: &str, timestamp: i64) -> EventItem {
        EventItem {
            id: content.into(),
            timestamp,
            content: content.into(),
            source_urls: vec![],
        }
    }

    #[test]
    fn test_timestamp_formatting() {
        let style = utc();
        assert_eq!(style.datetime(T0), "2024/3/5 06:07:08");
        assert_eq!(style.date(T0), "2024/3/5");

        let tokyo = PromptStyle {
            offset: FixedOffset::east_opt(9 * 3600).unwrap(),
            ..utc()
        };
        assert_eq!(tokyo.datetime(T0), "2024/3/5 15:07:08");
    }

    #[test]
    fn test_update_prompt_for_new_topic() {
        let prompt = update_prompt(&topic("Fusion"), &[], &utc());

        assert!(prompt.contains("Topic: Fusion"));
        assert!(prompt.contains("search across all time"));
        assert!(prompt.contains("identify and list 3-5"));
        assert!(!prompt.contains("focus points"));
        assert!(prompt.contains("4. After the event summary"));
        assert!(prompt.ends_with("Answer in English."));
    }

    #[test]
    fn test_update_prompt_uses_window_sources_and_subtopics() {
        let mut t = topic("Chips");
        t.last_updated = T0;
        t.relevant_sources = vec!["https://a.example".into(), "https://b.example".into()];
        let sub1 = topic("HBM");
        let sub2 = topic("EUV");

        let prompt = update_prompt(&t, &[&sub1, &sub2], &utc());

        assert!(prompt.contains("since 2024/3/5 06:07:08"));
        assert!(prompt.contains("https://a.example, https://b.example"));
        assert!(prompt.contains("focus points; prioritise developments related to them: HBM, EUV."));
        assert!(prompt.contains("5. After the event summary"));
    }

    #[test]
    fn test_parse_update_response_extracts_sites() {
        let raw = "<h3>News</h3><p>x</p>\n[RELEVANT_SITES: https://a.example, ftp://nope, https://b.example ,not-a-url]";
        let (summary, sites) = parse_update_response(raw);

        assert_eq!(summary, "<h3>News</h3><p>x</p>");
        assert_eq!(sites, vec!["https://a.example".to_string(), "https://b.example".to_string()]);
    }

    #[test]
    fn test_parse_update_response_without_trailer() {
        let (summary, sites) = parse_update_response("  <p>only</p>  ");
        assert_eq!(summary, "<p>only</p>");
        assert!(sites.is_empty());

        let (summary, sites) = parse_update_response("");
        assert_eq!(summary, EMPTY_UPDATE_TEXT);
        assert!(sites.is_empty());
    }

    #[test]
    fn test_parse_update_response_only_first_trailer() {
        let raw = "a [RELEVANT_SITES: https://one] b [RELEVANT_SITES: https://two]";
        let (summary, sites) = parse_update_response(raw);

        assert_eq!(sites, vec!["https://one".to_string()]);
        assert_eq!(summary, "a  b [RELEVANT_SITES: https://two]");
    }

    #[test]
    fn test_briefing_prompt_uses_last_three_events() {
        let mut a = topic("Alpha");
        a.events = (0..5).map(|i| event(&format!("a{}", i), T0)).collect();
        let b = topic("Beta");

        let prompt = briefing_prompt(&[a, b], &utc());

        assert!(!prompt.contains("a1"));
        assert!(prompt.contains("[2024/3/5] a2<br>[2024/3/5] a3<br>[2024/3/5] a4"));
        assert!(prompt.contains("Topic: Alpha<br>Background: Alpha description"));
        assert!(prompt.contains("<hr>Topic: Beta"));
    }

    #[test]
    fn test_chat_instruction_transcript() {
        let mut t = topic("Chips");
        assert!(chat_instruction(&t, &utc()).contains("The database is empty"));

        t.events = vec![event("<p>first</p>", T0), event("<p>second</p>", T0 + 1000)];
        let instruction = chat_instruction(&t, &utc());

        assert!(instruction.contains("topic \"Chips\" (description: Chips description)"));
        assert!(instruction.contains(
            "Entry #1 (recorded 2024/3/5 06:07:08)\nContent: <p>first</p>\n\nEntry #2 (recorded 2024/3/5 06:07:09)\nContent: <p>second</p>"
        ));
    }
}
