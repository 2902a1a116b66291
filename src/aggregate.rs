//! Per-cycle aggregation of departures into one [`DepartureInformation`].
//!
//! Each departure of the configured line is classified and counted. The
//! source-language warnings of disrupted departures are complemented with
//! target-language texts: the trip is re-queried in the target language and
//! texts the feed actually translated are kept as-is, while texts it returned
//! unchanged are machine translated. A failed re-query falls back to machine
//! translating everything. Translation failures only drop the affected
//! message from the target-language set. Each text is sent to the
//! translator at most once per cycle.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::classify::classify;
use crate::config::AggregationSettings;
use crate::feed::{Departure, DepartureBoard, FeedError, FeedSource};
use crate::sanitize::sanitize;
use crate::status::{DepartureInformation, DepartureStatus, LocalizedMessages, MessageList};
use crate::translate::Translator;

/// Result of one aggregation cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub information: DepartureInformation,
    /// The polled document; `None` when the cycle aborted early.
    pub board: Option<DepartureBoard>,
}

impl CycleReport {
    pub fn aborted(&self) -> bool {
        self.board.is_none()
    }
}

/// Running tally over the departures of one board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub running: usize,
}

impl Tally {
    pub fn record(&mut self, is_running: bool) {
        self.total += 1;
        if is_running {
            self.running += 1;
        }
    }

    pub fn not_running(&self) -> usize {
        self.total - self.running
    }

    /// Majority verdict. A share equal to `threshold` does not count as running.
    pub fn verdict(&self, threshold: f64) -> DepartureStatus {
        if self.total > 0 && self.running as f64 / self.total as f64 > threshold {
            DepartureStatus::Running
        } else if self.not_running() > 0 {
            DepartureStatus::NotRunning
        } else {
            // No departures of the line in the feed window: assume the line
            // has closed for the night.
            DepartureStatus::ClosingTime
        }
    }
}

/// Translation outcome per source text within one cycle; `None` when the
/// text could not be translated.
type TranslationMemo = HashMap<String, Option<String>>;

pub struct Aggregator<F, T> {
    feed: F,
    translator: T,
    settings: AggregationSettings,
}

impl<F: FeedSource, T: Translator> Aggregator<F, T> {
    pub fn new(feed: F, translator: T, settings: AggregationSettings) -> Self {
        Self {
            feed,
            translator,
            settings,
        }
    }

    /// Polls the feed once and aggregates the result.
    ///
    /// A failed departures request yields `NO_INFORMATION` without a board.
    #[tracing::instrument(skip(self), fields(line = %self.settings.line_name))]
    pub async fn run_cycle(&self) -> CycleReport {
        let board = match self.feed.fetch_departures().await {
            Ok(board) => board,
            Err(e) => {
                let kind = match e {
                    FeedError::Fetch(_) => "fetch",
                    FeedError::Parse(_) => "parse",
                };
                error!(error = %e, kind, "Departures unavailable, no information this cycle");
                return CycleReport {
                    information: DepartureInformation::no_information(),
                    board: None,
                };
            }
        };

        let information = self.aggregate(&board.departures).await;
        info!(
            status = %information.status,
            departures = board.departures.len(),
            "Cycle complete"
        );

        CycleReport {
            information,
            board: Some(board),
        }
    }

    /// Aggregates `departures`, ignoring those of other lines.
    pub async fn aggregate(&self, departures: &[Departure]) -> DepartureInformation {
        let source = self.settings.source_language.as_str();
        let target = self.settings.target_language.as_str();

        let mut tally = Tally::default();
        let mut messages = LocalizedMessages::new();
        let mut memo = TranslationMemo::new();

        for departure in departures
            .iter()
            .filter(|d| d.line_name() == Some(self.settings.line_name.as_str()))
        {
            let classification = classify(departure, &self.settings);
            tally.record(classification.is_running);
            debug!(
                trip_id = %departure.trip_id,
                is_running = classification.is_running,
                messages = classification.messages.len(),
                "Departure classified"
            );

            if classification.messages.is_empty() {
                continue;
            }

            let source_messages = messages.entry(source.to_string()).or_default();
            source_messages.extend_unique(classification.messages.iter());
            let known = source_messages.clone();

            let translated = self
                .cross_check(departure, &classification.messages, &known, &mut memo)
                .await;
            messages
                .entry(target.to_string())
                .or_default()
                .extend_unique(translated);
        }

        let status = tally.verdict(self.settings.running_threshold);
        info!(
            total = tally.total,
            running = tally.running,
            %status,
            "Departures aggregated"
        );

        DepartureInformation {
            status,
            observed_at: Utc::now(),
            messages,
        }
    }

    /// Target-language texts for the warnings of one departure.
    ///
    /// `known` is the source-language set collected so far; re-queried texts
    /// found in it were not translated by the feed.
    async fn cross_check(
        &self,
        departure: &Departure,
        messages: &MessageList,
        known: &MessageList,
        memo: &mut TranslationMemo,
    ) -> Vec<String> {
        let target = self.settings.target_language.as_str();

        if departure.trip_id.is_empty() {
            debug!("Departure has no trip id, translating locally");
            return self.translate_all(messages.iter(), memo).await;
        }

        let trip = match self.feed.fetch_trip(&departure.trip_id, target).await {
            Ok(trip) => trip,
            Err(e) => {
                warn!(
                    trip_id = %departure.trip_id,
                    error = %e,
                    "Trip re-query failed, translating locally"
                );
                return self.translate_all(messages.iter(), memo).await;
            }
        };

        let fetched = classify(&trip, &self.settings).messages;
        let (untranslated, upstream): (Vec<&str>, Vec<&str>) =
            fetched.iter().partition(|m| known.contains(m));
        debug!(
            trip_id = %departure.trip_id,
            untranslated = untranslated.len(),
            upstream = upstream.len(),
            "Trip re-queried"
        );

        let mut result = self.translate_all(untranslated, memo).await;
        result.extend(upstream.into_iter().map(str::to_string));
        result
    }

    /// Machine translates each message, dropping the ones that fail.
    ///
    /// Outcomes, failures included, are remembered in `memo`.
    async fn translate_all<'a>(
        &self,
        messages: impl IntoIterator<Item = &'a str>,
        memo: &mut TranslationMemo,
    ) -> Vec<String> {
        let source = self.settings.source_language.as_str();
        let target = self.settings.target_language.as_str();

        let mut translated = Vec::new();
        for message in messages {
            if let Some(known) = memo.get(message) {
                translated.extend(known.clone());
                continue;
            }

            let outcome = match self.translator.translate(message, source, target).await {
                Ok(text) => Some(sanitize(&text)).filter(|text| !text.is_empty()),
                Err(e) => {
                    warn!(error = %e, text = message, "Translation failed, message omitted");
                    None
                }
            };
            memo.insert(message.to_string(), outcome.clone());
            translated.extend(outcome);
        }
        translated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_majority_is_strict() {
        let tally = Tally {
            total: 2,
            running: 1,
        };
        assert_eq!(tally.verdict(0.5), DepartureStatus::NotRunning);

        let tally = Tally {
            total: 3,
            running: 2,
        };
        assert_eq!(tally.verdict(0.5), DepartureStatus::Running);
    }

    #[test]
    fn test_verdict_without_departures_is_closing_time() {
        assert_eq!(Tally::default().verdict(0.5), DepartureStatus::ClosingTime);
    }

    #[test]
    fn test_verdict_all_cancelled() {
        let tally = Tally {
            total: 4,
            running: 0,
        };
        assert_eq!(tally.verdict(0.5), DepartureStatus::NotRunning);
    }

    #[test]
    fn test_verdict_matches_share_rule() {
        for total in 1..=8usize {
            for running in 0..=total {
                let tally = Tally { total, running };
                let expected = if running as f64 / total as f64 > 0.5 {
                    DepartureStatus::Running
                } else {
                    DepartureStatus::NotRunning
                };
                assert_eq!(tally.verdict(0.5), expected, "{running}/{total}");
            }
        }
    }

    #[test]
    fn test_record_counts() {
        let mut tally = Tally::default();
        tally.record(true);
        tally.record(false);
        tally.record(true);
        assert_eq!(tally.total, 3);
        assert_eq!(tally.running, 2);
        assert_eq!(tally.not_running(), 1);
    }
}
