//! Per-row classification

use crate::error::Result;
use crate::reference::ReferenceSet;
use crate::site::{find_position_in_protein, parse_modifications, Classification};
use crate::table::PeptideRow;
use crate::uniprot::ProteinSource;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Classifies every modification site of a row
pub struct RowProcessor<S> {
    source: Arc<S>,
    reference: Arc<ReferenceSet>,
}

impl<S: ProteinSource> RowProcessor<S> {
    pub fn new(source: Arc<S>, reference: Arc<ReferenceSet>) -> Self {
        Self { source, reference }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// One classification per site that maps onto the protein
    ///
    /// When the protein sequence is unavailable the result is a single
    /// protein-not-found entry and the topology is never requested. Sites
    /// whose peptide does not occur in the sequence are left out.
    pub async fn process(&self, row: &PeptideRow) -> Result<Vec<Classification>> {
        let started = Instant::now();
        let accession = row.protein_id.trim();
        let membership = self.reference.membership(accession);

        let sequence = if accession.is_empty() {
            None
        } else {
            self.source.sequence(accession).await?
        };
        let Some(sequence) = sequence else {
            debug!(accession, "Protein sequence not found");
            return Ok(vec![Classification::protein_not_found(membership)]);
        };

        let offsets = parse_modifications(&row.modifications);
        let topology = self.source.topology(accession).await?;

        let classifications: Vec<Classification> = offsets
            .into_iter()
            .filter_map(|offset| {
                let position = find_position_in_protein(&sequence, &row.peptide, offset)?;
                Some(Classification::site(
                    position,
                    topology.classify(position),
                    membership,
                ))
            })
            .collect();

        debug!(
            accession,
            peptide = %row.peptide,
            sites = classifications.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Processed row"
        );
        Ok(classifications)
    }
}
