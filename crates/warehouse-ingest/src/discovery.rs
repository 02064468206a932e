//! Source file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists the files of `dir` whose extension matches `extension`
/// (case-insensitive), sorted by file name.
pub fn list_source_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_matching_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["i94_may16.xpt", "i94_apr16.XPT", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.xpt")).unwrap();

        let files = list_source_files(dir.path(), "xpt").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["i94_apr16.XPT", "i94_may16.xpt"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = list_source_files(&dir.path().join("absent"), "xpt").unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }
}
