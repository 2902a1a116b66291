//! Per-departure interpretation of feed remarks.

use crate::config::AggregationSettings;
use crate::feed::{Departure, RemarkKind};
use crate::sanitize::sanitize;
use crate::status::MessageList;

/// Outcome of classifying one departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_running: bool,
    /// Sanitized warning texts, deduplicated, in remark order.
    pub messages: MessageList,
}

/// Decides whether `departure` runs and collects its warning texts.
///
/// A status remark carrying one of the configured cancellation codes marks the
/// departure as not running. Scanning continues after that so later warnings
/// are still collected. Warnings without text, or whose text sanitizes to
/// nothing, are skipped.
pub fn classify(departure: &Departure, settings: &AggregationSettings) -> Classification {
    let mut is_running = true;
    let mut messages = MessageList::new();

    for remark in &departure.remarks {
        match remark.kind {
            RemarkKind::Status => {
                if remark
                    .code
                    .as_deref()
                    .is_some_and(|code| settings.is_cancellation_code(code))
                {
                    is_running = false;
                }
            }
            RemarkKind::Warning => {
                let Some(raw) = remark.text.as_deref().or(remark.summary.as_deref()) else {
                    continue;
                };
                let message = sanitize(raw);
                if !message.is_empty() {
                    messages.push_unique(message);
                }
            }
            RemarkKind::Hint | RemarkKind::Other => {}
        }
    }

    Classification {
        is_running,
        messages,
    }
}
