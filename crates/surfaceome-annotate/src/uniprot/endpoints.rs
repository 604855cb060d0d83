//! UniProt endpoint URL builders

/// FASTA record of a single entry
pub fn fasta_url(base_url: &str, accession: &str) -> String {
    format!(
        "{}/{}.fasta",
        base_url.trim_end_matches('/'),
        urlencoding::encode(accession)
    )
}

/// Flat-text record of a single entry
pub fn entry_text_url(base_url: &str, accession: &str) -> String {
    format!(
        "{}/{}.txt",
        base_url.trim_end_matches('/'),
        urlencoding::encode(accession)
    )
}
