use crate::rules::RuleTable;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// The terminal result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// No rule changed the content.
    Unchanged,
    /// The content was (or, in preview mode, would be) rewritten with this many replacements.
    Sanitized(usize),
    /// The file could not be read or decoded as UTF-8.
    SkippedReadError(String),
    /// The rewritten content could not be saved. The file keeps its original content.
    SkippedWriteError(String),
}

impl FileOutcome {
    /// Short machine-friendly name of the outcome kind.
    pub fn kind(&self) -> &'static str {
        match self {
            FileOutcome::Unchanged => "unchanged",
            FileOutcome::Sanitized(_) => "sanitized",
            FileOutcome::SkippedReadError(_) => "read_error",
            FileOutcome::SkippedWriteError(_) => "write_error",
        }
    }

    pub fn replacements(&self) -> usize {
        match self {
            FileOutcome::Sanitized(count) => *count,
            _ => 0,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            FileOutcome::SkippedReadError(_) | FileOutcome::SkippedWriteError(_)
        )
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Unchanged => write!(f, "unchanged"),
            FileOutcome::Sanitized(count) => write!(f, "sanitized ({count} replacements)"),
            FileOutcome::SkippedReadError(reason) => write!(f, "skipped, read error: {reason}"),
            FileOutcome::SkippedWriteError(reason) => write!(f, "skipped, write error: {reason}"),
        }
    }
}

/// Runs read, substitute and write for a single file.
///
/// Failures never escape as errors: they become `Skipped*` outcomes so that
/// one bad file cannot stop a run.
pub struct FileProcessor<'a> {
    rules: &'a RuleTable,
}

impl<'a> FileProcessor<'a> {
    pub fn new(rules: &'a RuleTable) -> Self {
        Self { rules }
    }

    /// Processes one file. With `preview_only` set, the outcome reports what
    /// would be written but the file is never touched.
    pub fn process(&self, path: &Path, preview_only: bool) -> FileOutcome {
        let content = match read_text(path) {
            Ok(content) => content,
            Err(e) => return FileOutcome::SkippedReadError(e.to_string()),
        };

        let result = self.rules.substitute(&content);
        if result.content == content.as_str() {
            return FileOutcome::Unchanged;
        }

        if preview_only {
            return FileOutcome::Sanitized(result.total);
        }

        match write_atomically(path, result.content.as_ref()) {
            Ok(()) => {
                debug!(path = %path.display(), replacements = result.total, "wrote sanitized file");
                FileOutcome::Sanitized(result.total)
            }
            Err(e) => FileOutcome::SkippedWriteError(e.to_string()),
        }
    }
}

/// Reads a whole file as UTF-8.
fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Replaces the file's content in one step.
///
/// The new content goes to a temporary file next to the target, which takes the
/// target's permissions and is then renamed over it. A symlink is resolved
/// first, so the link stays in place and its target gets the new content. A
/// failure at any point leaves the target untouched.
fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    let target = fs::canonicalize(path)?;
    let perms = fs::metadata(&target)?.permissions();
    if perms.readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "file is read-only",
        ));
    }
    // A rename would bypass the target's mode bits, so open it for writing first.
    OpenOptions::new().write(true).open(&target)?;

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    fs::set_permissions(temp_file.path(), perms)?;
    temp_file.persist(&target).map_err(|e| e.error)?;
    Ok(())
}
