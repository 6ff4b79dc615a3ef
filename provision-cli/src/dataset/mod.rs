//! Spreadsheet input loading
//!
//! The pipeline core only ever sees flat rows of column-name to string-value
//! pairs; this module is the edge that produces them from CSV or Excel files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

/// A parsed spreadsheet: headers plus one string map per row.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl Dataset {
    /// Load a dataset, dispatching on the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::from_csv(path),
            "xlsx" | "xls" | "ods" => Self::from_excel(path),
            other => bail!("unsupported spreadsheet format '.{}'", other),
        }
    }

    fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read CSV record")?;
            let row: HashMap<String, String> = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    (
                        header.clone(),
                        record.get(i).unwrap_or_default().to_string(),
                    )
                })
                .collect();
            rows.push(row);
        }

        Ok(Self {
            file_name: file_name_of(path),
            headers,
            rows,
        })
    }

    fn from_excel(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .context("workbook has no sheets")?
            .clone();

        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        let mut row_iter = range.rows();
        let headers: Vec<String> = row_iter
            .next()
            .map(|row| row.iter().map(cell_string).collect())
            .unwrap_or_default();

        let rows = row_iter
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        (
                            header.clone(),
                            row.get(i).map(cell_string).unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            file_name: file_name_of(path),
            headers,
            rows,
        })
    }

    /// First data row, used for mapping previews. Empty map when the dataset
    /// has no rows.
    pub fn sample_row(&self) -> HashMap<String, String> {
        self.rows.first().cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Whole numbers come back as floats from Excel
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
