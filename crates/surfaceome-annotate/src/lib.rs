//! Surfaceome Annotate Library
//!
//! Marks modification sites of identified peptides as extracellular or not,
//! using UniProt topology annotation, and flags proteins found on a reference
//! surfaceome list.
//!
//! # Overview
//!
//! - **Table I/O**: read the peptide table and write it back with three derived
//!   columns ([`table`])
//! - **Site mapping**: parse modification offsets and place them on the protein
//!   ([`site`])
//! - **Topology**: parse extracellular regions from UniProt flat text
//!   ([`topology`])
//! - **Retrieval**: cached, retrying UniProt lookups ([`uniprot`])
//! - **Batch**: bounded concurrent row processing ([`batch`])
//!
//! # Example
//!
//! ```no_run
//! use surfaceome_annotate::{pipeline, AnnotateConfig};
//!
//! #[tokio::main]
//! async fn main() -> surfaceome_annotate::Result<()> {
//!     let summary = pipeline::run(&AnnotateConfig::default()).await?;
//!     println!("{} sites classified", summary.sites);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod reference;
pub mod site;
pub mod table;
pub mod topology;
pub mod uniprot;

// Re-export commonly used types
pub use batch::{BatchDriver, RunSummary};
pub use config::AnnotateConfig;
pub use error::{AnnotateError, Result};
pub use processor::RowProcessor;
pub use site::{Classification, ExtracellularStatus, ReferenceMembership, RowAnnotation};

use clap::Parser;
use config::{DEFAULT_CONCURRENCY, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_REFERENCE};
use std::path::PathBuf;
use std::time::Duration;
use uniprot::client::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, DEFAULT_UNIPROT_URL};
use uniprot::fetcher::DEFAULT_CACHE_CAPACITY;

/// Annotate peptide modification sites with extracellular topology
#[derive(Parser, Debug)]
#[command(name = "surfaceome-annotate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Peptide table (tab-separated)
    #[arg(short, long, env = "SURFACEOME_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Reference accession list, one per line
    #[arg(short, long, env = "SURFACEOME_REFERENCE", default_value = DEFAULT_REFERENCE)]
    pub reference: PathBuf,

    /// Output table; comma-separated if it ends in .csv, tab-separated otherwise
    #[arg(short, long, env = "SURFACEOME_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// UniProtKB REST base URL
    #[arg(long, env = "SURFACEOME_UNIPROT_URL", default_value = DEFAULT_UNIPROT_URL)]
    pub base_url: String,

    /// Rows processed concurrently
    #[arg(long, env = "SURFACEOME_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "SURFACEOME_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Retries per request on connection failure or 429/5xx
    #[arg(long, env = "SURFACEOME_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Proteins remembered per record type
    #[arg(long, env = "SURFACEOME_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> AnnotateConfig {
        AnnotateConfig {
            input: self.input,
            reference: self.reference,
            output: self.output,
            base_url: self.base_url,
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            cache_capacity: self.cache_capacity,
            show_progress: !self.no_progress,
        }
    }
}
