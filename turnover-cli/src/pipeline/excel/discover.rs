//! Locate the input workbook by name pattern

use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::error::PipelineError;

/// File-name marker identifying the input workbook.
const NAME_MARKER: &str = "Inventory Turnover";

/// Raw export files carry this marker and are skipped.
const EXCLUDE_MARKER: &str = "DATA";

/// Find the unique workbook in `dir` whose name contains the marker and is
/// not a raw data export.
///
/// Zero matches and multiple matches are distinct errors rather than a
/// silent first pick; candidates are sorted by file name so the ambiguity
/// diagnostic is deterministic.
pub fn find_workbook(dir: &Path) -> Result<PathBuf, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|source| PipelineError::ScanDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::ScanDir {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(NAME_MARKER) && !name.contains(EXCLUDE_MARKER) {
            candidates.push(name);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => Err(PipelineError::InputNotFound {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(dir.join(&candidates[0])),
        _ => Err(PipelineError::AmbiguousInput {
            dir: dir.to_path_buf(),
            candidates,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_unique_match_found() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Inventory Turnover Q1.xlsx")).unwrap();
        File::create(dir.path().join("unrelated.xlsx")).unwrap();

        let path = find_workbook(dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "Inventory Turnover Q1.xlsx"
        );
    }

    #[test]
    fn test_data_exports_excluded() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Inventory Turnover Q1.xlsx")).unwrap();
        File::create(dir.path().join("Inventory Turnover Q1 DATA.xlsx")).unwrap();

        let path = find_workbook(dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "Inventory Turnover Q1.xlsx"
        );
    }

    #[test]
    fn test_no_match_is_error() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("something else.xlsx")).unwrap();

        let err = find_workbook(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound { .. }));
    }

    #[test]
    fn test_multiple_matches_is_error() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Inventory Turnover Q1.xlsx")).unwrap();
        File::create(dir.path().join("Inventory Turnover Q2.xlsx")).unwrap();

        let err = find_workbook(dir.path()).unwrap_err();
        match err {
            PipelineError::AmbiguousInput { candidates, .. } => {
                assert_eq!(
                    candidates,
                    vec![
                        "Inventory Turnover Q1.xlsx".to_string(),
                        "Inventory Turnover Q2.xlsx".to_string(),
                    ]
                );
            }
            other => panic!("expected AmbiguousInput, got {other:?}"),
        }
    }
}
