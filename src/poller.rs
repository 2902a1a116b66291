//! The periodic background task driving the pipeline.

use anyhow::Result;
use tracing::{Instrument, error, info, warn};

use crate::aggregate::Aggregator;
use crate::config::{PollSettings, PublishPolicy};
use crate::feed::FeedSource;
use crate::snapshot::{SnapshotError, write_debug_snapshot};
use crate::status::{DepartureInformation, DepartureStatus};
use crate::store::StatusStore;
use crate::translate::Translator;

/// Runs aggregation cycles one after another and publishes their results.
pub struct Poller<F, T> {
    aggregator: Aggregator<F, T>,
    store: StatusStore,
    settings: PollSettings,
    cycles: u64,
}

impl<F: FeedSource, T: Translator> Poller<F, T> {
    pub fn new(aggregator: Aggregator<F, T>, store: StatusStore, settings: PollSettings) -> Self {
        Self {
            aggregator,
            store,
            settings,
            cycles: 0,
        }
    }

    /// Runs one cycle, publishes its result and writes a debug snapshot if
    /// the line is not running.
    ///
    /// # Errors
    ///
    /// Only a failed snapshot write is reported; every upstream failure is
    /// absorbed into the cycle's result.
    pub async fn run_once(&mut self) -> Result<DepartureInformation, SnapshotError> {
        self.cycles += 1;
        let report = self.aggregator.run_cycle().await;

        let publish = !report.aborted()
            || self.settings.publish_policy == PublishPolicy::Overwrite
            || self.cycles == 1;
        if publish {
            self.store.publish(report.information.clone()).await;
        } else {
            warn!("Cycle aborted, keeping last published result");
        }

        if report.information.status == DepartureStatus::NotRunning {
            if let Some(board) = &report.board {
                write_debug_snapshot(&self.settings.snapshot_dir, &report.information, &board.raw)?;
            }
        }

        Ok(report.information)
    }

    /// Cycles forever, sleeping for the configured interval between cycles.
    ///
    /// Returns only when a debug snapshot cannot be written.
    pub async fn run(mut self) -> Result<()> {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            policy = ?self.settings.publish_policy,
            "Poller started"
        );
        loop {
            let span = tracing::info_span!("poll_cycle", cycle = self.cycles + 1);
            if let Err(e) = self.run_once().instrument(span).await {
                error!(error = %e, "Writing debug snapshot failed");
                return Err(e.into());
            }
            tokio::time::sleep(self.settings.interval).await;
        }
    }
}
