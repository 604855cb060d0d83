//! Extracellular topology of a protein
//!
//! UniProt flat-text records carry topology as feature lines followed by a
//! note line, for example:
//!
//! ```text
//! FT   TOPO_DOM        24..185
//! FT                   /note="Extracellular"
//! ```
//!
//! [`parse_topology`] keeps only the extracellular domains. A record without
//! any `TOPO_DOM` line yields [`Topology::Unknown`], which classifies as
//! "Not Available" rather than "No".

use crate::site::ExtracellularStatus;
use tracing::warn;

const TOPOLOGY_MARKER: &str = "TOPO_DOM";
const EXTRACELLULAR_MARKER: &str = "Extracellular";

/// Inclusive, 1-indexed residue interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtracellularRegion {
    pub start: usize,
    pub end: usize,
}

impl ExtracellularRegion {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Topology knowledge for one protein
///
/// Regions keep record order and are never merged; they may overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    /// No topology annotation at all (or the record was unavailable)
    Unknown,
    /// Annotated topology; an empty list means no extracellular region
    Known(Vec<ExtracellularRegion>),
}

impl Topology {
    pub fn regions(&self) -> Option<&[ExtracellularRegion]> {
        match self {
            Topology::Unknown => None,
            Topology::Known(regions) => Some(regions),
        }
    }

    /// Classify a residue position against this topology
    pub fn classify(&self, position: usize) -> ExtracellularStatus {
        match self {
            Topology::Unknown => ExtracellularStatus::NotAvailable,
            Topology::Known(regions) => is_position_extracellular(position, regions).into(),
        }
    }
}

/// True iff `position` lies inside at least one region
pub fn is_position_extracellular(position: usize, regions: &[ExtracellularRegion]) -> bool {
    regions.iter().any(|region| region.contains(position))
}

/// Extract extracellular regions from a UniProt flat-text record
///
/// A line containing `TOPO_DOM` is kept only when the line right after it
/// contains `Extracellular`. Its bounds come from the third
/// whitespace-separated token, written `start..end`. Candidates that cannot
/// be parsed are logged and skipped.
pub fn parse_topology(record: &str) -> Topology {
    let lines: Vec<&str> = record.lines().collect();
    let mut found_topology = false;
    let mut regions = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if !line.contains(TOPOLOGY_MARKER) {
            continue;
        }
        found_topology = true;

        let next = lines.get(index + 1).copied().unwrap_or("");
        if !next.contains(EXTRACELLULAR_MARKER) {
            continue;
        }

        match parse_region(line) {
            Ok(region) => regions.push(region),
            Err(reason) => warn!(line = %line.trim_end(), reason, "Skipping malformed topology line"),
        }
    }

    if found_topology {
        Topology::Known(regions)
    } else {
        Topology::Unknown
    }
}

fn parse_region(line: &str) -> Result<ExtracellularRegion, &'static str> {
    let range = line
        .split_whitespace()
        .nth(2)
        .ok_or("not enough fields")?;
    let (start, end) = range.split_once("..").ok_or("range has no '..'")?;

    let start = start.parse().map_err(|_| "range start is not an integer")?;
    let end = end.parse().map_err(|_| "range end is not an integer")?;

    Ok(ExtracellularRegion::new(start, end))
}
