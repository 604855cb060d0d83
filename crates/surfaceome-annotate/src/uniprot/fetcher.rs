//! Memoized sequence and topology lookups

use crate::error::Result;
use crate::topology::{parse_topology, Topology};
use crate::uniprot::client::UniProtClient;
use async_trait::async_trait;
use std::sync::Arc;
use surfaceome_common::cache::{CacheStats, SingleFlightCache};
use tracing::{debug, instrument};

/// Distinct proteins remembered per record type
pub const DEFAULT_CACHE_CAPACITY: usize = 5000;

/// Source of per-protein annotation used by the row processor
#[async_trait]
pub trait ProteinSource: Send + Sync {
    /// Full amino-acid sequence, or `None` when it cannot be retrieved
    async fn sequence(&self, accession: &str) -> Result<Option<Arc<str>>>;

    /// Extracellular topology; [`Topology::Unknown`] when not annotated or
    /// not retrievable
    async fn topology(&self, accession: &str) -> Result<Arc<Topology>>;
}

/// Concatenate the body lines of a FASTA record, dropping the header
///
/// Returns `None` for a record without residues.
pub fn parse_fasta_sequence(record: &str) -> Option<String> {
    let sequence: String = record.lines().skip(1).map(str::trim).collect();
    (!sequence.is_empty()).then_some(sequence)
}

/// [`ProteinSource`] backed by UniProt with bounded single-flight caches
pub struct UniProtFetcher {
    client: UniProtClient,
    sequences: SingleFlightCache<String, Option<Arc<str>>>,
    topologies: SingleFlightCache<String, Arc<Topology>>,
}

impl UniProtFetcher {
    pub fn new(client: UniProtClient, cache_capacity: usize) -> Self {
        Self {
            client,
            sequences: SingleFlightCache::new(cache_capacity),
            topologies: SingleFlightCache::new(cache_capacity),
        }
    }

    pub fn sequence_cache_stats(&self) -> CacheStats {
        self.sequences.stats()
    }

    pub fn topology_cache_stats(&self) -> CacheStats {
        self.topologies.stats()
    }
}

#[async_trait]
impl ProteinSource for UniProtFetcher {
    #[instrument(skip(self))]
    async fn sequence(&self, accession: &str) -> Result<Option<Arc<str>>> {
        self.sequences
            .get_or_try_init(accession.to_string(), || async {
                let record = self.client.fetch_fasta(accession).await?;
                let sequence = record.as_deref().and_then(parse_fasta_sequence);
                debug!(length = sequence.as_ref().map(String::len), "Sequence fetched");
                Ok(sequence.map(Arc::from))
            })
            .await
    }

    #[instrument(skip(self))]
    async fn topology(&self, accession: &str) -> Result<Arc<Topology>> {
        self.topologies
            .get_or_try_init(accession.to_string(), || async {
                let topology = match self.client.fetch_entry_text(accession).await? {
                    Some(record) => parse_topology(&record),
                    None => Topology::Unknown,
                };
                debug!(
                    regions = topology.regions().map(<[_]>::len),
                    "Topology fetched"
                );
                Ok(Arc::new(topology))
            })
            .await
    }
}
