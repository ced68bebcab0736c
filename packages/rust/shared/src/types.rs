//! Core domain types for NoahAid: topics, messages, and highlighted text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How urgent a first-aid topic is. Informational only; no logic reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A single first-aid scenario in the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Stable key, unique within a knowledge base. Never used for matching.
    pub id: String,
    /// Human-readable name; its lowercase form is also matched against queries.
    pub title: String,
    /// Urgency label.
    pub severity: Severity,
    /// Lowercase trigger keywords, in priority order for highlighting.
    pub keywords: Vec<String>,
    /// Instructions, delivered one message per step.
    pub steps: Vec<String>,
}

// ---------------------------------------------------------------------------
// RichText
// ---------------------------------------------------------------------------

/// One run of text inside a [`RichText`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Span {
    Plain(String),
    Emphasis(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(t) | Self::Emphasis(t) => t,
        }
    }

    pub fn is_emphasis(&self) -> bool {
        matches!(self, Self::Emphasis(_))
    }
}

/// Text made of alternating plain and emphasized spans.
///
/// Renderers either walk [`RichText::spans`] directly or ask for
/// [`RichText::to_markup`], which escapes literal text and only emits
/// `<b>` tags as structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    spans: Vec<Span>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single plain span.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut rich = Self::new();
        rich.push_plain(text);
        rich
    }

    /// Append plain text, merging into a trailing plain span. Empty input is dropped.
    pub fn push_plain(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(Span::Plain(last)) => last.push_str(&text),
            _ => self.spans.push(Span::Plain(text)),
        }
    }

    /// Append an emphasized span. Adjacent emphasis spans stay separate.
    pub fn push_emphasis(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span::Emphasis(text));
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn into_spans(self) -> Vec<Span> {
        self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterate over the emphasized fragments only.
    pub fn emphasized(&self) -> impl Iterator<Item = &str> {
        self.spans
            .iter()
            .filter(|s| s.is_emphasis())
            .map(Span::text)
    }

    /// The text with all emphasis dropped.
    pub fn to_plain(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }

    /// HTML-ish markup: emphasis wrapped in `<b>...</b>`, literal text escaped.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match span {
                Span::Plain(t) => escape_into(&mut out, t),
                Span::Emphasis(t) => {
                    out.push_str("<b>");
                    escape_into(&mut out, t);
                    out.push_str("</b>");
                }
            }
        }
        out
    }
}

impl From<Vec<Span>> for RichText {
    fn from(spans: Vec<Span>) -> Self {
        let mut rich = Self::new();
        for span in spans {
            match span {
                Span::Plain(t) => rich.push_plain(t),
                Span::Emphasis(t) => rich.push_emphasis(t),
            }
        }
        rich
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for message identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
}

/// One entry in the append-only conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub kind: MessageKind,
    /// Raw input for user messages; highlighted step or fallback for the assistant.
    pub text: RichText,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// A user message holding the raw, untrimmed input.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            kind: MessageKind::User,
            text: RichText::plain(text),
            sent_at: Utc::now(),
        }
    }

    pub fn assistant(text: RichText) -> Self {
        Self {
            id: MessageId::new(),
            kind: MessageKind::Assistant,
            text,
            sent_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind == MessageKind::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Medium).expect("serialize");
        assert_eq!(json, "\"medium\"");
        let parsed: Severity = serde_json::from_str("\"high\"").expect("deserialize");
        assert_eq!(parsed, Severity::High);
    }

    #[test]
    fn topic_deserializes_from_json() {
        let json = r#"{
            "id": "burn",
            "title": "Thermal burn (minor)",
            "severity": "medium",
            "keywords": ["burn", "scald"],
            "steps": ["Cool the burn."]
        }"#;
        let topic: Topic = serde_json::from_str(json).expect("parse topic");
        assert_eq!(topic.id, "burn");
        assert_eq!(topic.severity, Severity::Medium);
        assert_eq!(topic.keywords, vec!["burn", "scald"]);
    }

    #[test]
    fn push_plain_merges_adjacent_runs() {
        let mut rich = RichText::plain("Apply ");
        rich.push_plain("firm pressure");
        assert_eq!(rich.spans(), &[Span::Plain("Apply firm pressure".into())]);
    }

    #[test]
    fn empty_spans_are_dropped() {
        let mut rich = RichText::new();
        rich.push_plain("");
        rich.push_emphasis("");
        assert!(rich.is_empty());
        assert_eq!(rich.to_markup(), "");
    }

    #[test]
    fn markup_wraps_emphasis_and_escapes_text() {
        let rich = RichText::from(vec![
            Span::Plain("a < b & ".into()),
            Span::Emphasis("burn".into()),
            Span::Plain(" > c".into()),
        ]);
        assert_eq!(rich.to_markup(), "a &lt; b &amp; <b>burn</b> &gt; c");
        assert_eq!(rich.to_plain(), "a < b & burn > c");
        assert_eq!(rich.emphasized().collect::<Vec<_>>(), vec!["burn"]);
    }

    #[test]
    fn user_message_keeps_raw_text() {
        let msg = Message::user("  help, it burns  ");
        assert!(msg.is_user());
        assert_eq!(msg.text.to_plain(), "  help, it burns  ");
        assert_eq!(msg.text.emphasized().count(), 0);
    }

    #[test]
    fn message_serialization() {
        let mut text = RichText::plain("Cool the ");
        text.push_emphasis("burn");
        let msg = Message::assistant(text);

        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("\"kind\":\"assistant\""));
        assert!(json.contains("\"emphasis\""));
        let parsed: Message = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, msg);
    }
}
