//! Resolving conflicts in files on disk.
//!
//! A file is only rewritten when at least one conflict was resolved or
//! reduced and the text actually changed. Rewrites go through a temporary
//! file in the same directory followed by a rename, so readers never see a
//! half-written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ResolutionOptions;
use crate::conflict::{parse, resolve_parsed, Item, Outcome};
use crate::errors::FileError;

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    /// The file contains no conflict markers.
    NoConflicts,
    /// Conflicts were found but the text did not change.
    Unchanged,
    /// The file was rewritten with the resolved text.
    Rewritten,
    /// The file would have been rewritten (dry run).
    WouldRewrite,
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    pub action: FileAction,
}

impl FileReport {
    /// One-line human summary of this file's outcome.
    pub fn message(&self) -> String {
        let o = &self.outcome;
        if self.action == FileAction::NoConflicts {
            return "No conflicts found".to_string();
        }

        if o.resolved == 0 && o.reduced == 0 {
            format!("Failed to resolve {} conflict(s)", o.failed)
        } else if o.resolved == 0 {
            format!("Reduced {} conflict(s)", o.reduced)
        } else {
            let remaining = o.reduced + o.failed;
            let mut msg = format!("Successfully resolved {} conflict(s)", o.resolved);
            if remaining > 0 {
                msg.push_str(&format!(" (failed to resolve {} conflict(s))", remaining));
            }
            msg
        }
    }
}

/// Resolve the conflicts in the file at `path`.
///
/// With `write` false the file is never touched and a change is reported as
/// [`FileAction::WouldRewrite`].
pub fn resolve_file(
    path: &Path,
    options: &ResolutionOptions,
    write: bool,
) -> Result<FileReport, FileError> {
    if !path.exists() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let items = parse(&content).map_err(|source| FileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if !items.iter().any(Item::is_conflict) {
        debug!(path = %path.display(), "no conflicts");
        return Ok(FileReport {
            path: path.to_path_buf(),
            outcome: Outcome::EMPTY,
            action: FileAction::NoConflicts,
        });
    }

    let processed = resolve_parsed(options, &content, &items);
    let outcome = processed.outcome;
    info!(
        path = %path.display(),
        resolved = outcome.resolved,
        reduced = outcome.reduced,
        failed = outcome.failed,
        "processed file"
    );

    let progressed = outcome.resolved > 0 || outcome.reduced > 0;
    let action = if !progressed || processed.text == content {
        FileAction::Unchanged
    } else if write {
        overwrite_atomically(path, &processed.text)?;
        FileAction::Rewritten
    } else {
        FileAction::WouldRewrite
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        outcome,
        action,
    })
}

/// Replace the contents of `path` via a temporary file and rename.
///
/// The original file's permissions are carried over. On failure the
/// original file is left as it was.
pub fn overwrite_atomically(path: &Path, content: &str) -> Result<(), FileError> {
    let wrap = |source: std::io::Error| FileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".remerge-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(wrap)?;
    tmp.write_all(content.as_bytes()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;

    match fs::metadata(path) {
        Ok(meta) => fs::set_permissions(tmp.path(), meta.permissions()).map_err(wrap)?,
        Err(e) => warn!(path = %path.display(), error = %e, "could not read original permissions"),
    }

    tmp.persist(path).map_err(|e| wrap(e.error))?;
    debug!(path = %path.display(), bytes = content.len(), "file rewritten");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIVIAL: &str = "keep\n<<<<<<< ours\nx\n||||||| base\nx\n======= theirs\ny\n>>>>>>>\ntail\n";
    const HARD: &str = "<<<<<<< ours\na\n||||||| base\nb\n======= theirs\nc\n>>>>>>>\n";

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_resolves_and_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.txt", TRIVIAL);

        let report = resolve_file(&path, &ResolutionOptions::default(), true).unwrap();
        assert_eq!(report.action, FileAction::Rewritten);
        assert_eq!(report.outcome, Outcome::resolved(1));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep\ny\ntail\n");
    }

    #[test]
    fn test_dry_run_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.txt", TRIVIAL);

        let report = resolve_file(&path, &ResolutionOptions::default(), false).unwrap();
        assert_eq!(report.action, FileAction::WouldRewrite);
        assert_eq!(fs::read_to_string(&path).unwrap(), TRIVIAL);
    }

    #[test]
    fn test_unresolvable_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "b.txt", HARD);

        let report = resolve_file(&path, &ResolutionOptions::default(), true).unwrap();
        assert_eq!(report.action, FileAction::Unchanged);
        assert_eq!(report.outcome, Outcome::failed(1));
        assert_eq!(fs::read_to_string(&path).unwrap(), HARD);
    }

    #[test]
    fn test_no_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "c.txt", "just\ntext");

        let report = resolve_file(&path, &ResolutionOptions::default(), true).unwrap();
        assert_eq!(report.action, FileAction::NoConflicts);
        assert_eq!(report.outcome, Outcome::EMPTY);
        assert_eq!(report.message(), "No conflicts found");
    }

    #[test]
    fn test_missing_file() {
        let result = resolve_file(
            Path::new("/nonexistent/remerge.txt"),
            &ResolutionOptions::default(),
            true,
        );
        assert!(matches!(result, Err(FileError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "d.txt", "<<<<<<< ours\nx\n");

        let result = resolve_file(&path, &ResolutionOptions::default(), true);
        assert!(matches!(result, Err(FileError::Parse { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<<<<<<< ours\nx\n");
    }

    #[test]
    fn test_overwrite_keeps_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "e.txt", "old");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        }

        overwrite_atomically(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o640);
        }

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".remerge-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_messages() {
        let report = |outcome| FileReport {
            path: PathBuf::from("f"),
            outcome,
            action: FileAction::Unchanged,
        };
        assert_eq!(
            report(Outcome::failed(2)).message(),
            "Failed to resolve 2 conflict(s)"
        );
        assert_eq!(report(Outcome::reduced(1)).message(), "Reduced 1 conflict(s)");
        assert_eq!(
            report(Outcome::resolved(3)).message(),
            "Successfully resolved 3 conflict(s)"
        );
        assert_eq!(
            report(Outcome {
                resolved: 1,
                reduced: 1,
                failed: 1
            })
            .message(),
            "Successfully resolved 1 conflict(s) (failed to resolve 2 conflict(s))"
        );
    }
}
