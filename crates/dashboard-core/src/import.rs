//! Reading populated templates back into typed records
//!
//! A file fails as a whole only when it cannot be read, has no header row or
//! lacks a required column. Bad data rows are collected per row and the
//! remaining rows still import.

use crate::csv::{parse_records, CsvRecord, Header, Row};
use crate::error::ImportError;
use crate::model::*;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Records from one template plus the rows that were rejected
#[derive(Debug)]
pub struct Imported<T> {
    pub records: Vec<T>,
    pub row_errors: Vec<ImportError>,
}

impl<T> Imported<T> {
    pub fn is_clean(&self) -> bool {
        self.row_errors.is_empty()
    }
}

/// Parse template text; the first non-comment record is the header
pub fn parse_template<T: CsvRecord>(text: &str) -> Result<Imported<T>, ImportError> {
    let raw = parse_records(text)?;
    let (header_record, rows) = raw.split_first().ok_or(ImportError::MissingHeader)?;
    let header = Header::bind::<T>(&header_record.fields)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut row_errors = Vec::new();
    for record in rows {
        match T::from_row(&Row::new(&header, record)) {
            Ok(value) => records.push(value),
            Err(e) => {
                warn!(error = %e, "rejected row");
                row_errors.push(e);
            }
        }
    }

    debug!(rows = records.len(), rejected = row_errors.len(), "parsed template");
    Ok(Imported { records, row_errors })
}

pub fn read_template<T: CsvRecord>(path: &Path) -> Result<Imported<T>, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_template(&text)
}

/// Result of importing one template file from a directory
#[derive(Debug)]
pub struct FileImport {
    pub file_name: &'static str,
    /// Records accepted; zero when the file failed as a whole
    pub records: usize,
    pub row_errors: Vec<String>,
    pub failure: Option<ImportError>,
}

/// Every template found in a directory
#[derive(Debug, Default)]
pub struct ImportedTables {
    pub monthly_costs: Option<Vec<MonthlyCostSummary>>,
    pub high_cost_claimants: Option<Vec<HighCostClaimant>>,
    pub diagnosis_by_cost: Option<Vec<DiagnosisByCost>>,
    pub diagnosis_by_utilization: Option<Vec<DiagnosisByUtilization>>,
    pub drug_classes: Option<Vec<DrugClass>>,
    pub preventive_screenings: Option<Vec<PreventiveScreening>>,
    pub chronic_condition_compliance: Option<Vec<ChronicConditionCompliance>>,
    /// One entry per template file present, in catalogue order
    pub files: Vec<FileImport>,
}

impl ImportedTables {
    pub fn has_errors(&self) -> bool {
        self.files
            .iter()
            .any(|f| f.failure.is_some() || !f.row_errors.is_empty())
    }
}

fn load<T: CsvRecord>(dir: &Path, files: &mut Vec<FileImport>) -> Option<Vec<T>> {
    let path = dir.join(T::FILE_NAME);
    if !path.is_file() {
        debug!(file = T::FILE_NAME, "template not present");
        return None;
    }

    match read_template::<T>(&path) {
        Ok(imported) => {
            info!(
                file = T::FILE_NAME,
                records = imported.records.len(),
                rejected = imported.row_errors.len(),
                "imported template"
            );
            files.push(FileImport {
                file_name: T::FILE_NAME,
                records: imported.records.len(),
                row_errors: imported.row_errors.iter().map(|e| e.to_string()).collect(),
                failure: None,
            });
            Some(imported.records)
        }
        Err(e) => {
            warn!(file = T::FILE_NAME, error = %e, "template import failed");
            files.push(FileImport {
                file_name: T::FILE_NAME,
                records: 0,
                row_errors: Vec::new(),
                failure: Some(e),
            });
            None
        }
    }
}

/// Import every known template present in `dir`. Missing files are skipped.
pub fn import_directory(dir: &Path) -> ImportedTables {
    let mut files = Vec::new();
    ImportedTables {
        monthly_costs: load(dir, &mut files),
        high_cost_claimants: load(dir, &mut files),
        diagnosis_by_cost: load(dir, &mut files),
        diagnosis_by_utilization: load(dir, &mut files),
        drug_classes: load(dir, &mut files),
        preventive_screenings: load(dir, &mut files),
        chronic_condition_compliance: load(dir, &mut files),
        files,
    }
}
