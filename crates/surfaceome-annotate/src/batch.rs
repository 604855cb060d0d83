//! Concurrent row processing
//!
//! Rows run as tokio tasks, at most `concurrency` at a time, and their results
//! land in a slot per input row so the output keeps input order. A failing row
//! does not stop the others: every row is driven to completion and the first
//! failure observed is returned afterwards.

use crate::error::{AnnotateError, Result};
use crate::processor::RowProcessor;
use crate::site::{Classification, ExtracellularStatus};
use crate::table::PeptideRow;
use crate::uniprot::ProteinSource;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use surfaceome_common::cache::CacheStats;
use tokio::task::JoinError;
use tracing::{info, warn};

pub struct BatchDriver<S> {
    processor: Arc<RowProcessor<S>>,
    concurrency: usize,
    progress: ProgressBar,
}

impl<S: ProteinSource + 'static> BatchDriver<S> {
    /// `concurrency` is clamped to at least one row in flight
    pub fn new(processor: Arc<RowProcessor<S>>, concurrency: usize) -> Self {
        Self {
            processor,
            concurrency: concurrency.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Classify every row, returning results in input order
    pub async fn run(&self, rows: Vec<PeptideRow>) -> Result<Vec<Vec<Classification>>> {
        let total = rows.len();
        info!(rows = total, concurrency = self.concurrency, "Annotating rows");

        let mut slots: Vec<Option<Vec<Classification>>> = vec![None; total];
        let mut first_error: Option<AnnotateError> = None;

        let mut outcomes = stream::iter(rows.into_iter().enumerate())
            .map(|(index, row)| {
                let processor = Arc::clone(&self.processor);
                async move {
                    let outcome = tokio::spawn(async move { processor.process(&row).await }).await;
                    (index, outcome)
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((index, outcome)) = outcomes.next().await {
            self.progress.inc(1);

            let err = match outcome {
                Ok(Ok(classifications)) => {
                    slots[index] = Some(classifications);
                    continue;
                },
                Ok(Err(err)) => AnnotateError::row_failed(index, err),
                Err(join_error) => AnnotateError::Task {
                    index,
                    message: describe_join_error(join_error),
                },
            };

            warn!(row = index, error = %err, "Row failed");
            first_error.get_or_insert(err);
        }
        self.progress.finish_and_clear();

        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    match err.into_panic().downcast::<String>() {
        Ok(message) => format!("panicked: {message}"),
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => format!("panicked: {message}"),
            Err(_) => "panicked".to_string(),
        },
    }
}

/// Totals for one annotation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Rows annotated
    pub rows: usize,
    /// Rows dropped before annotation
    pub rows_filtered: usize,
    /// Classifications emitted, protein-not-found entries included
    pub sites: usize,
    pub status_counts: BTreeMap<ExtracellularStatus, usize>,
    pub sequence_cache: CacheStats,
    pub topology_cache: CacheStats,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_results(results: &[Vec<Classification>], rows_filtered: usize) -> Self {
        let mut status_counts = BTreeMap::new();
        for classification in results.iter().flatten() {
            *status_counts.entry(classification.extracellular).or_insert(0) += 1;
        }

        Self {
            rows: results.len(),
            rows_filtered,
            sites: results.iter().map(Vec::len).sum(),
            status_counts,
            ..Self::default()
        }
    }

    pub fn with_cache_stats(mut self, sequences: CacheStats, topologies: CacheStats) -> Self {
        self.sequence_cache = sequences;
        self.topology_cache = topologies;
        self
    }

    pub fn finish(mut self, started: Instant) -> Self {
        self.elapsed = started.elapsed();
        self
    }

    pub fn count(&self, status: ExtracellularStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    pub fn log(&self) {
        info!(
            rows = self.rows,
            rows_filtered = self.rows_filtered,
            sites = self.sites,
            extracellular = self.count(ExtracellularStatus::Yes),
            intracellular_or_other = self.count(ExtracellularStatus::No),
            not_available = self.count(ExtracellularStatus::NotAvailable),
            protein_not_found = self.count(ExtracellularStatus::ProteinNotFound),
            elapsed_secs = self.elapsed.as_secs_f64(),
            "Annotation complete"
        );
        info!(
            sequence_hits = self.sequence_cache.hits,
            sequence_misses = self.sequence_cache.misses,
            sequence_hit_rate = format!("{:.1}%", self.sequence_cache.hit_rate()),
            topology_hits = self.topology_cache.hits,
            topology_misses = self.topology_cache.misses,
            topology_hit_rate = format!("{:.1}%", self.topology_cache.hit_rate()),
            "Cache statistics"
        );
    }
}
