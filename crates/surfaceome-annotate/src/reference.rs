//! Reference set of known cell-surface proteins (the Wollscheid list)

use crate::error::Result;
use crate::site::ReferenceMembership;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Protein accessions considered surface-exposed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    accessions: HashSet<String>,
}

impl ReferenceSet {
    /// Load one accession per line; surrounding whitespace and blank lines
    /// are ignored
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let set = Self::from_lines(&text);
        info!(path = %path.display(), accessions = set.len(), "Loaded reference set");
        Ok(set)
    }

    pub fn from_lines(text: &str) -> Self {
        text.lines().collect()
    }

    pub fn contains(&self, accession: &str) -> bool {
        self.accessions.contains(accession)
    }

    pub fn membership(&self, accession: &str) -> ReferenceMembership {
        self.contains(accession).into()
    }

    pub fn len(&self) -> usize {
        self.accessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessions.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let accessions = iter
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|accession| !accession.is_empty())
            .collect();
        Self { accessions }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_lines() {
        let set = ReferenceSet::from_lines("P12345\r\n  Q9Y6K9 \n\nO15551\n");

        assert_eq!(set.len(), 3);
        assert!(set.contains("Q9Y6K9"));
        assert_eq!(set.membership("P12345"), ReferenceMembership::Yes);
        assert_eq!(set.membership("P99999"), ReferenceMembership::No);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "P12345").unwrap();
        writeln!(file, "P67890").unwrap();

        let set = ReferenceSet::from_path(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("P67890"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ReferenceSet::from_path(Path::new("/nonexistent/wollscheid.txt")).is_err());
    }
}
