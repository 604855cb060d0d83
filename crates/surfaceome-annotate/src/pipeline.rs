//! End-to-end annotation run

use crate::batch::{BatchDriver, RunSummary};
use crate::config::AnnotateConfig;
use crate::error::Result;
use crate::processor::RowProcessor;
use crate::progress::create_row_progress;
use crate::reference::ReferenceSet;
use crate::site::RowAnnotation;
use crate::table::PeptideTable;
use crate::uniprot::{UniProtClient, UniProtFetcher};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Read the inputs, annotate every row and write the output table
///
/// Nothing is written unless every row succeeds.
pub async fn run(config: &AnnotateConfig) -> Result<RunSummary> {
    config.validate()?;
    let started = Instant::now();

    info!(
        input = %config.input.display(),
        reference = %config.reference.display(),
        base_url = %config.base_url,
        "Starting annotation run"
    );

    let reference = Arc::new(ReferenceSet::from_path(&config.reference)?);
    let mut table = PeptideTable::read(&config.input)?;
    let rows_filtered = table.retain_annotatable();

    let client = UniProtClient::new(&config.base_url, config.timeout, config.retry_policy())?;
    let fetcher = Arc::new(UniProtFetcher::new(client, config.cache_capacity));
    let processor = Arc::new(RowProcessor::new(Arc::clone(&fetcher), reference));
    let driver = BatchDriver::new(processor, config.concurrency)
        .with_progress(create_row_progress(table.len() as u64, config.show_progress));

    let results = driver.run(table.rows()).await?;

    let annotations: Vec<RowAnnotation> = results
        .iter()
        .map(|classifications| RowAnnotation::render(classifications))
        .collect();
    table.write_annotated(&config.output, &annotations)?;

    let summary = RunSummary::from_results(&results, rows_filtered)
        .with_cache_stats(fetcher.sequence_cache_stats(), fetcher.topology_cache_stats())
        .finish(started);
    summary.log();
    Ok(summary)
}
