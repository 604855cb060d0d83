//! UniProt retrieval
//!
//! [`client`] speaks HTTP, [`endpoints`] builds record URLs and [`fetcher`]
//! memoizes parsed records per accession.

pub mod client;
pub mod endpoints;
pub mod fetcher;

pub use client::{RetryPolicy, UniProtClient};
pub use fetcher::{ProteinSource, UniProtFetcher};
