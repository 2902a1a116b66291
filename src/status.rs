//! Aggregate result types published once per poll cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Overall verdict for the configured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepartureStatus {
    Running,
    NotRunning,
    ClosingTime,
    NoInformation,
}

impl fmt::Display for DepartureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DepartureStatus::Running => "RUNNING",
            DepartureStatus::NotRunning => "NOT_RUNNING",
            DepartureStatus::ClosingTime => "CLOSING_TIME",
            DepartureStatus::NoInformation => "NO_INFORMATION",
        };
        f.write_str(s)
    }
}

/// Ordered list of distinct message strings.
///
/// Insertion order is kept; pushing a string that is already present
/// (exact, case-sensitive match) is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageList(Vec<String>);

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` unless an equal entry exists. Returns whether it was added.
    pub fn push_unique(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.0.contains(&message) {
            return false;
        }
        self.0.push(message);
        true
    }

    pub fn extend_unique<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.push_unique(message);
        }
    }

    pub fn contains(&self, message: &str) -> bool {
        self.0.iter().any(|m| m == message)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for MessageList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = MessageList::new();
        list.extend_unique(iter);
        list
    }
}

/// Message lists keyed by language code (`"de"`, `"en"`, ...).
pub type LocalizedMessages = BTreeMap<String, MessageList>;

/// The result of one poll cycle. Never mutated once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartureInformation {
    pub status: DepartureStatus,
    pub observed_at: DateTime<Utc>,
    pub messages: LocalizedMessages,
}

impl DepartureInformation {
    /// A result carrying no messages, stamped with the current time.
    pub fn empty(status: DepartureStatus) -> Self {
        Self {
            status,
            observed_at: Utc::now(),
            messages: LocalizedMessages::new(),
        }
    }

    pub fn no_information() -> Self {
        Self::empty(DepartureStatus::NoInformation)
    }

    /// Messages for `language`, empty if none were collected.
    pub fn messages_for(&self, language: &str) -> &[String] {
        self.messages
            .get(language)
            .map(MessageList::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_unique_rejects_duplicates() {
        let mut list = MessageList::new();
        assert!(list.push_unique("Bauarbeiten"));
        assert!(!list.push_unique("Bauarbeiten"));
        assert!(list.push_unique("bauarbeiten"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_extend_unique_keeps_first_occurrence_order() {
        let mut list = MessageList::new();
        list.extend_unique(["b", "a", "b", "c", "a"]);
        assert_eq!(list.as_slice(), ["b", "a", "c"]);
    }

    #[test]
    fn test_messages_for_missing_language_is_empty() {
        let info = DepartureInformation::no_information();
        assert!(info.messages_for("en").is_empty());
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&DepartureStatus::ClosingTime).unwrap();
        assert_eq!(json, "\"CLOSING_TIME\"");
        assert_eq!(DepartureStatus::NotRunning.to_string(), "NOT_RUNNING");
    }
}
