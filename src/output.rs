//! Result types returned by a rename run.

use crate::error::FileError;
use serde::{Deserialize, Serialize};

/// What happened to one image.
///
/// Exactly one of `new_name` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Filename before the run.
    pub original: String,
    /// Filename after the run (or the name a dry run would have used).
    pub new_name: Option<String>,
    pub error: Option<FileError>,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
}

impl FileOutcome {
    pub fn is_renamed(&self) -> bool {
        self.error.is_none() && self.new_name.is_some()
    }
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenameStats {
    /// Supported images found in the directory.
    pub total_files: usize,
    pub renamed_files: usize,
    pub failed_files: usize,
    pub total_duration_ms: u64,
}

/// Full output of [`crate::rename::rename_directory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameReport {
    /// One entry per scanned image, in processing order.
    pub files: Vec<FileOutcome>,
    pub stats: RenameStats,
    /// True when the filesystem was left untouched.
    pub dry_run: bool,
}

impl RenameReport {
    /// Iterate over the failures only.
    pub fn errors(&self) -> impl Iterator<Item = &FileError> {
        self.files.iter().filter_map(|f| f.error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_with_error_is_not_renamed() {
        let o = FileOutcome {
            original: "a.png".into(),
            new_name: None,
            error: Some(FileError::NoSuggestion {
                file: "a.png".into(),
            }),
            duration_ms: 3,
        };
        assert!(!o.is_renamed());
    }

    #[test]
    fn test_report_serialises_to_json() {
        let report = RenameReport {
            files: vec![FileOutcome {
                original: "a.png".into(),
                new_name: Some("cat.png".into()),
                error: None,
                duration_ms: 10,
            }],
            stats: RenameStats {
                total_files: 1,
                renamed_files: 1,
                failed_files: 0,
                total_duration_ms: 10,
            },
            dry_run: false,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["new_name"], "cat.png");
        assert_eq!(json["stats"]["renamed_files"], 1);
        assert_eq!(report.errors().count(), 0);
    }
}
