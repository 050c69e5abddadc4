use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{LedgerError, Result};

/// One named table in the ledger. Row 0 is the header row, the rest are
/// data rows in append order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Worksheet {
    pub rows: Vec<Vec<String>>,
}

impl Worksheet {
    pub fn cell(&self, row: usize, position: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(position))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Writes `value` into a cell, padding the row when it is shorter than
    /// the header row.
    pub fn set_cell(&mut self, row: usize, position: usize, value: String) {
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() <= position {
                cells.resize(position + 1, String::new());
            }
            cells[position] = value;
        }
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn is_blank_row(cells: &[String]) -> bool {
        cells.iter().all(|cell| cell.trim().is_empty())
    }

    /// Writes the worksheet as CSV, header row first. Rows shorter than the
    /// header are padded with empty cells so the output stays rectangular.
    /// Returns the number of rows written.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<usize> {
        let mut out = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        let width = self.rows.first().map_or(0, Vec::len);
        for row in &self.rows {
            if row.len() < width {
                let mut padded = row.clone();
                padded.resize(width, String::new());
                out.write_record(&padded)?;
            } else {
                out.write_record(row)?;
            }
        }
        out.flush()?;
        Ok(self.rows.len())
    }
}

/// The ledger file: worksheets keyed by name, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workbook {
    pub sheets: IndexMap<String, Worksheet>,
}

impl Workbook {
    /// Loads the ledger, yielding an empty workbook when the file does not
    /// exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).map_err(|err| LedgerError::from_io(path, err))?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&data)?)
    }

    /// Persists the whole document atomically: written to a temporary file
    /// in the target directory, then renamed over the ledger.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|err| LedgerError::from_io(path, err))?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| LedgerError::from_io(path, err))?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.persist(path)
            .map_err(|err| LedgerError::from_io(path, err.error))?;
        Ok(())
    }
}
