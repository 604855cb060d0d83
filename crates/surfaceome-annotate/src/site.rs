//! Modification sites and their classification
//!
//! A row of the peptide table names a protein, a peptide and a list of
//! modification tokens such as `5M(15.9949), 12C(57.0215)`. Each token yields a
//! peptide-relative offset, which is mapped onto the full protein sequence and
//! classified against the protein's extracellular regions.

use std::fmt;

/// Extract peptide-relative modification offsets from an "Assigned
/// Modifications" string
///
/// Tokens are separated by `", "`. A token counts only if it contains `(`;
/// the text before the first `(` loses its trailing residue letter and must
/// then be a non-empty run of ASCII digits. Other tokens (`N-term(42.0106)`,
/// `n(42.0106)`, free text) are dropped without complaint.
///
/// ```
/// use surfaceome_annotate::site::parse_modifications;
///
/// assert_eq!(parse_modifications("5M(15.9949), N-term(42.0106), 12C(57.0215)"), vec![5, 12]);
/// assert_eq!(parse_modifications("185(15.9949)"), vec![185]);
/// ```
pub fn parse_modifications(assigned: &str) -> Vec<usize> {
    assigned
        .split(", ")
        .filter_map(|token| {
            let (head, _) = token.split_once('(')?;
            let digits = head
                .strip_suffix(|c: char| c.is_ascii_alphabetic())
                .unwrap_or(head);

            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        })
        .collect()
}

/// Map a 1-indexed peptide offset to its absolute position in the protein
///
/// The peptide is located by first occurrence; the result is the 0-indexed
/// start of that match plus `offset`, which makes it a 1-indexed residue
/// number. Returns `None` when the peptide does not occur in the sequence or
/// the position does not fit in `usize`.
pub fn find_position_in_protein(sequence: &str, peptide: &str, offset: usize) -> Option<usize> {
    sequence.find(peptide)?.checked_add(offset)
}

/// Whether a site lies in an extracellular region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtracellularStatus {
    Yes,
    No,
    /// The protein has no topology annotation, or it could not be fetched
    NotAvailable,
    /// The protein sequence itself could not be fetched
    ProteinNotFound,
}

impl ExtracellularStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtracellularStatus::Yes => "Yes",
            ExtracellularStatus::No => "No",
            ExtracellularStatus::NotAvailable => "Not Available",
            ExtracellularStatus::ProteinNotFound => "Protein sequence not found",
        }
    }
}

impl From<bool> for ExtracellularStatus {
    fn from(extracellular: bool) -> Self {
        if extracellular {
            ExtracellularStatus::Yes
        } else {
            ExtracellularStatus::No
        }
    }
}

impl fmt::Display for ExtracellularStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the protein is on the reference surfaceome list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceMembership {
    Yes,
    No,
}

impl ReferenceMembership {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceMembership::Yes => "Yes",
            ReferenceMembership::No => "No",
        }
    }
}

impl From<bool> for ReferenceMembership {
    fn from(member: bool) -> Self {
        if member {
            ReferenceMembership::Yes
        } else {
            ReferenceMembership::No
        }
    }
}

impl fmt::Display for ReferenceMembership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute residue position of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitePosition {
    /// 1-indexed residue number in the full protein sequence
    Residue(usize),
    /// Placeholder for a row whose protein sequence is unavailable
    ProteinNotFound,
}

impl SitePosition {
    pub fn residue(&self) -> Option<usize> {
        match self {
            SitePosition::Residue(position) => Some(*position),
            SitePosition::ProteinNotFound => None,
        }
    }
}

/// Outcome for one modification site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub position: SitePosition,
    pub extracellular: ExtracellularStatus,
    pub membership: ReferenceMembership,
}

impl Classification {
    pub fn site(
        position: usize,
        extracellular: ExtracellularStatus,
        membership: ReferenceMembership,
    ) -> Self {
        Self {
            position: SitePosition::Residue(position),
            extracellular,
            membership,
        }
    }

    /// The single entry emitted for a row whose protein sequence is missing
    pub fn protein_not_found(membership: ReferenceMembership) -> Self {
        Self {
            position: SitePosition::ProteinNotFound,
            extracellular: ExtracellularStatus::ProteinNotFound,
            membership,
        }
    }
}

/// The three derived output columns of one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowAnnotation {
    /// "Position in Protein"
    pub positions: String,
    /// "Is Extracellular"
    pub extracellular: String,
    /// "IsWollschied"
    pub membership: String,
}

impl RowAnnotation {
    /// Render classifications as ", "-joined columns
    ///
    /// The protein-not-found placeholder is left out of the position column
    /// but still contributes to the other two.
    pub fn render(classifications: &[Classification]) -> Self {
        let positions = classifications
            .iter()
            .filter_map(|c| c.position.residue())
            .map(|position| position.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let extracellular = classifications
            .iter()
            .map(|c| c.extracellular.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let membership = classifications
            .iter()
            .map(|c| c.membership.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            positions,
            extracellular,
            membership,
        }
    }
}
