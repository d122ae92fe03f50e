//! Output directory contract
//!
//! The directory is created with its parents and existing artifacts are
//! overwritten. Each artifact is written independently: a failure is logged
//! and collected in the [`ExportReport`] while the remaining artifacts are
//! still written. Only failing to create the directory aborts the run.

use crate::dataset::CompleteDashboardData;
use crate::error::ExportError;
use crate::mapping::visualization_mapping;
use crate::templates::catalogue;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const MAPPING_FILE: &str = "visualization_mapping.json";
pub const MOCK_DATASET_FILE: &str = "mock_dataset.json";

/// Artifacts written by one export run
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ExportError>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: PathBuf, result: Result<(), ExportError>) {
        match result {
            Ok(()) => {
                info!(path = %path.display(), "wrote artifact");
                self.written.push(path);
            }
            Err(e) => {
                warn!(error = %e, "failed to write artifact");
                self.failures.push(e);
            }
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
///
/// A failed write leaves any previous file at `path` untouched and removes
/// the temp file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let tmp = tmp_path(path);
    let result = fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    result.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        ExportError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn create_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ExportError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, json.as_bytes())
}

fn templates_into(dir: &Path, report: &mut ExportReport) {
    for template in catalogue() {
        let path = dir.join(template.file_name);
        let result = write_atomic(&path, template.render().as_bytes());
        report.record(path, result);
    }
}

/// Write every CSV template into `dir`
pub fn write_templates(dir: &Path) -> Result<ExportReport, ExportError> {
    create_dir(dir)?;
    let mut report = ExportReport::default();
    templates_into(dir, &mut report);
    Ok(report)
}

/// Write the visualization mapping JSON to `path`
pub fn write_mapping(path: &Path) -> Result<(), ExportError> {
    write_json(path, &visualization_mapping())
}

/// Write the templates, the visualization mapping and, when given, the
/// dataset as `mock_dataset.json`
pub fn write_all(
    dir: &Path,
    dataset: Option<&CompleteDashboardData>,
) -> Result<ExportReport, ExportError> {
    create_dir(dir)?;
    let mut report = ExportReport::default();
    templates_into(dir, &mut report);

    let path = dir.join(MAPPING_FILE);
    let result = write_mapping(&path);
    report.record(path, result);

    if let Some(data) = dataset {
        let path = dir.join(MOCK_DATASET_FILE);
        let result = data.to_json_file(&path);
        report.record(path, result);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_write_atomic_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_atomic(&path, b"x").unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_write_templates_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let report = write_templates(&out).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 7);
        assert!(out.join("monthly_costs.csv").is_file());
    }

    #[test]
    fn test_failed_artifact_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where a file should go makes that rename fail
        fs::create_dir(dir.path().join("drug_classes.csv")).unwrap();
        fs::write(dir.path().join("drug_classes.csv").join("keep"), "x").unwrap();

        let report = write_all(dir.path(), None).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.written.len(), 7);
        assert!(dir.path().join(MAPPING_FILE).is_file());
        assert!(!dir.path().join(MOCK_DATASET_FILE).exists());
    }

    #[test]
    fn test_create_dir_failure_is_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = write_templates(&file.path().join("sub")).unwrap_err();
        assert!(matches!(err, ExportError::CreateDir { .. }));
    }
}
