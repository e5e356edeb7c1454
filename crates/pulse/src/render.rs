//! Terminal rendering helpers.
//!
//! Model output is stored as HTML. For the terminal it is flattened to text
//! with a handful of tag rules; `--raw` flags bypass this.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{Local, TimeZone};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|<hr\s*/?>|</(p|h[1-6]|li|ul|ol|div|tr)>").expect("valid regex"));
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li[^>]*>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Flatten model HTML into readable plain text.
pub fn html_to_text(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = LIST_ITEM.replace_all(&text, "  • ");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    BLANK_RUN
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Local `YYYY-MM-DD HH:MM` for an epoch-millisecond timestamp. Zero renders as "never".
pub fn timestamp(millis: i64) -> String {
    if millis == 0 {
        return "never".to_string();
    }
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => millis.to_string(),
    }
}

/// Spinner shown while waiting on the model.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
