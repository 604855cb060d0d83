//! Run configuration for the annotation job

use crate::error::{AnnotateError, Result};
use crate::uniprot::client::{
    RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, DEFAULT_UNIPROT_URL,
};
use crate::uniprot::fetcher::DEFAULT_CACHE_CAPACITY;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Run Defaults
// ============================================================================

pub const DEFAULT_INPUT: &str = "combined_modified_peptide.tsv";
pub const DEFAULT_REFERENCE: &str = "surfaceome_accession_wollschied.txt";
pub const DEFAULT_OUTPUT: &str = "updated_peptide.tsv";

/// Rows processed concurrently
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Settings for one annotation run
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateConfig {
    /// Peptide table to annotate
    pub input: PathBuf,

    /// Reference accession list, one per line
    pub reference: PathBuf,

    /// Annotated table destination
    pub output: PathBuf,

    /// UniProtKB REST base URL
    pub base_url: String,

    pub concurrency: usize,
    pub timeout: Duration,
    pub max_retries: u32,
    pub cache_capacity: usize,

    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            reference: PathBuf::from(DEFAULT_REFERENCE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            base_url: DEFAULT_UNIPROT_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            show_progress: true,
        }
    }
}

impl AnnotateConfig {
    /// Reject settings the run cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AnnotateError::config("concurrency must be at least 1"));
        }
        if self.cache_capacity == 0 {
            return Err(AnnotateError::config("cache capacity must be at least 1"));
        }
        if self.base_url.trim().is_empty() {
            return Err(AnnotateError::config("UniProt base URL must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(AnnotateError::config("request timeout must be positive"));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default().with_max_retries(self.max_retries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnnotateConfig::default();

        assert_eq!(config.input, PathBuf::from("combined_modified_peptide.tsv"));
        assert_eq!(config.output, PathBuf::from("updated_peptide.tsv"));
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.cache_capacity, 5000);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.retry_policy().max_retries, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = AnnotateConfig {
            concurrency: 0,
            ..AnnotateConfig::default()
        };
        assert!(matches!(config.validate(), Err(AnnotateError::Config(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = AnnotateConfig {
            cache_capacity: 0,
            ..AnnotateConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_base_url_rejected() {
        let config = AnnotateConfig {
            base_url: "  ".to_string(),
            ..AnnotateConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
