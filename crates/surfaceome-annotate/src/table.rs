//! Peptide table input and annotated table output
//!
//! The input is a tab-separated export with a header row. Only three columns
//! are interpreted; every other column is carried through to the output
//! untouched.

use crate::error::{AnnotateError, Result};
use crate::site::RowAnnotation;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub const PEPTIDE_COLUMN: &str = "Peptide Sequence";
pub const MODIFICATIONS_COLUMN: &str = "Assigned Modifications";
pub const PROTEIN_COLUMN: &str = "Protein ID";

pub const POSITION_COLUMN: &str = "Position in Protein";
pub const EXTRACELLULAR_COLUMN: &str = "Is Extracellular";
pub const REFERENCE_COLUMN: &str = "IsWollschied";

/// The fields of one row the annotation works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeptideRow {
    pub protein_id: String,
    pub peptide: String,
    pub modifications: String,
}

impl PeptideRow {
    pub fn new(
        protein_id: impl Into<String>,
        peptide: impl Into<String>,
        modifications: impl Into<String>,
    ) -> Self {
        Self {
            protein_id: protein_id.into(),
            peptide: peptide.into(),
            modifications: modifications.into(),
        }
    }

    /// Rows without a peptide or without modifications are not annotated
    pub fn is_annotatable(&self) -> bool {
        !self.peptide.trim().is_empty() && !self.modifications.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    peptide: usize,
    modifications: usize,
    protein: usize,
}

/// An input table held in memory
#[derive(Debug, Clone)]
pub struct PeptideTable {
    headers: StringRecord,
    records: Vec<StringRecord>,
    columns: ColumnIndex,
}

impl PeptideTable {
    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, &path.display().to_string())?;
        info!(path = %path.display(), rows = table.len(), "Loaded peptide table");
        Ok(table)
    }

    /// Parse a tab-separated table; `source` names it in error messages
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let find = |column: &str| {
            headers
                .iter()
                .position(|header| header.trim() == column)
                .ok_or_else(|| AnnotateError::missing_column(column, source))
        };
        let columns = ColumnIndex {
            peptide: find(PEPTIDE_COLUMN)?,
            modifications: find(MODIFICATIONS_COLUMN)?,
            protein: find(PROTEIN_COLUMN)?,
        };

        let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            headers,
            records,
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn row_at(&self, record: &StringRecord) -> PeptideRow {
        let field = |index: usize| record.get(index).unwrap_or("").to_string();
        PeptideRow {
            protein_id: field(self.columns.protein),
            peptide: field(self.columns.peptide),
            modifications: field(self.columns.modifications),
        }
    }

    /// The annotated fields of every row, in table order
    pub fn rows(&self) -> Vec<PeptideRow> {
        self.records.iter().map(|record| self.row_at(record)).collect()
    }

    /// Drop rows that cannot be annotated; returns how many were removed
    pub fn retain_annotatable(&mut self) -> usize {
        let before = self.records.len();
        let kept: Vec<StringRecord> = self
            .records
            .iter()
            .filter(|record| self.row_at(record).is_annotatable())
            .cloned()
            .collect();
        self.records = kept;
        let removed = before - self.records.len();
        info!(kept = self.records.len(), removed, "Filtered peptide rows");
        removed
    }

    /// Write the table plus the three derived columns to `path`
    ///
    /// Comma-separated when the path ends in `.csv`, tab-separated otherwise.
    pub fn write_annotated(&self, path: &Path, annotations: &[RowAnnotation]) -> Result<()> {
        let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
            _ => b'\t',
        };
        let file = std::fs::File::create(path)?;
        self.write_annotated_to(file, delimiter, annotations)?;
        info!(path = %path.display(), rows = self.len(), "Wrote annotated table");
        Ok(())
    }

    pub fn write_annotated_to<W: Write>(
        &self,
        writer: W,
        delimiter: u8,
        annotations: &[RowAnnotation],
    ) -> Result<()> {
        if annotations.len() != self.records.len() {
            return Err(AnnotateError::config(format!(
                "{} annotations for {} rows",
                annotations.len(),
                self.records.len()
            )));
        }

        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(writer);

        let width = self.headers.len();
        let mut header = self.headers.clone();
        header.push_field(POSITION_COLUMN);
        header.push_field(EXTRACELLULAR_COLUMN);
        header.push_field(REFERENCE_COLUMN);
        writer.write_record(&header)?;

        for (record, annotation) in self.records.iter().zip(annotations) {
            let mut out = record.clone();
            // Pad ragged rows so the derived columns line up with their headers.
            while out.len() < width {
                out.push_field("");
            }
            out.push_field(&annotation.positions);
            out.push_field(&annotation.extracellular);
            out.push_field(&annotation.membership);
            writer.write_record(&out)?;
        }

        writer.flush()?;
        Ok(())
    }
}
