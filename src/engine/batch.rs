//! Batch orchestration
//!
//! Fans single-token analysis out over a list with bounded concurrency.
//! One outcome per input, in input order; a failing address never
//! affects its siblings.

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::Analyzer;
use crate::models::AnalysisOutcome;

/// Progress callback: `(completed, total)` after each finished item
pub type ProgressFn<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Summary of one batch run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub run_id: Uuid,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<AnalysisOutcome>,
}

impl BatchReport {
    pub fn from_outcomes(run_id: Uuid, results: Vec<AnalysisOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            run_id,
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

impl Analyzer {
    /// Analyze every address; output length and order match the input
    ///
    /// Each item runs under a child of `cancel`, so cancelling the batch
    /// cancels every pending item while items never cancel each other.
    pub async fn analyze_many(
        &self,
        addresses: &[String],
        progress: Option<&ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> Vec<AnalysisOutcome> {
        let total = addresses.len();
        let mut completed = 0usize;

        let mut pending = stream::iter(addresses.iter().cloned().enumerate().map(|(index, address)| {
            let item_cancel = cancel.child_token();
            async move {
                let outcome = match self.analyze_cancellable(&address, &item_cancel).await {
                    Ok(record) => AnalysisOutcome::Success(record),
                    Err(e) => AnalysisOutcome::error(address, e),
                };
                (index, outcome)
            }
        }))
        .buffer_unordered(self.max_concurrency());

        let mut indexed: Vec<(usize, AnalysisOutcome)> = Vec::with_capacity(total);
        while let Some(entry) = pending.next().await {
            completed += 1;
            if let Some(progress) = progress {
                progress(completed, total);
            }
            indexed.push(entry);
        }

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// [`Analyzer::analyze_many`] wrapped in a run id and summary counts
    pub async fn analyze_batch(
        &self,
        addresses: &[String],
        progress: Option<&ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let run_id = Uuid::new_v4();
        tracing::info!(run_id = %run_id, total = addresses.len(), "Batch started");

        let results = self.analyze_many(addresses, progress, cancel).await;
        let report = BatchReport::from_outcomes(run_id, results);

        tracing::info!(
            run_id = %run_id,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "Batch finished"
        );
        report
    }
}
