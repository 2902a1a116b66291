//! Runtime settings for the pipeline and its collaborators.

use anyhow::{Result, bail};
use std::path::PathBuf;
use std::time::Duration;

/// Status codes the VBB feed uses for cancelled journeys and skipped stops.
pub const DEFAULT_CANCELLATION_CODES: &[&str] = &[
    "text.realtime.journey.cancelled",
    "text.realtime.stop.cancelled",
];

/// Where and how to query the departures feed.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub base_url: String,
    pub stop_id: String,
    pub duration_minutes: u32,
    /// Language requested for the departure board.
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct AggregationSettings {
    pub line_name: String,
    pub source_language: String,
    pub target_language: String,
    pub cancellation_codes: Vec<String>,
    /// Share of running departures that must be exceeded for `RUNNING`.
    pub running_threshold: f64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            line_name: "S85".to_string(),
            source_language: "de".to_string(),
            target_language: "en".to_string(),
            cancellation_codes: DEFAULT_CANCELLATION_CODES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            running_threshold: 0.5,
        }
    }
}

impl AggregationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.line_name.trim().is_empty() {
            bail!("line name must not be empty");
        }
        if !(0.0..1.0).contains(&self.running_threshold) {
            bail!(
                "running threshold must lie in [0, 1), got {}",
                self.running_threshold
            );
        }
        if self.source_language == self.target_language {
            bail!(
                "source and target language are both '{}'",
                self.source_language
            );
        }
        Ok(())
    }

    pub fn is_cancellation_code(&self, code: &str) -> bool {
        self.cancellation_codes.iter().any(|c| c == code)
    }
}

/// What to publish when a cycle aborts before aggregating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishPolicy {
    /// Replace the published result with a fresh `NO_INFORMATION`.
    #[default]
    Overwrite,
    /// Keep the last published result.
    KeepLastKnownGood,
}

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub snapshot_dir: PathBuf,
    pub publish_policy: PublishPolicy,
}

impl PollSettings {
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            bail!("poll interval must be non-zero");
        }
        Ok(())
    }
}
