use crate::errors::Result;
use crate::patterns::SKIP_DIRS;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Options controlling directory traversal.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Directory names pruned wherever they appear.
    pub skip_dirs: Vec<String>,
    /// Honour `.gitignore` and related ignore files.
    pub respect_gitignore: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            skip_dirs: SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            respect_gitignore: false,
        }
    }
}

/// Collects every regular file under `root`, sorted by name within each directory.
///
/// Hidden files are included. Symlinks are not descended into, but a symlink
/// whose target is a regular file is listed unless that target is already in
/// the list. Entries that cannot be read below the root are logged and
/// skipped; a failure on the root itself is returned.
pub fn collect_files(root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(format!("Directory '{}' does not exist", root.display()).into());
    }

    let skip_dirs = options.skip_dirs.clone();
    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .hidden(false)
        .git_ignore(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .ignore(options.respect_gitignore)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry.depth() > 0
                && skip_dirs
                    .iter()
                    .any(|d| entry.file_name() == d.as_str()))
        });

    let canonical_root = fs::canonicalize(root)?;
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == Some(0) => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_file() {
            // Links are never followed, so the walked path is already canonical below the root.
            if let Ok(relative) = entry.path().strip_prefix(root) {
                seen.insert(canonical_root.join(relative));
            }
            candidates.push((entry.into_path(), false));
        } else if file_type.is_symlink() {
            candidates.push((entry.into_path(), true));
        }
    }

    let mut files = Vec::with_capacity(candidates.len());
    for (path, is_link) in candidates {
        if !is_link {
            files.push(path);
            continue;
        }
        match fs::canonicalize(&path) {
            Ok(target) if target.is_file() => {
                if seen.insert(target) {
                    files.push(path);
                } else {
                    debug!(path = %path.display(), "symlink target already listed");
                }
            }
            Ok(_) => debug!(path = %path.display(), "skipping symlink to non-file"),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping dangling symlink"),
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_skips_infrastructure_dirs_and_keeps_hidden_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for dir in [".git", "node_modules/pkg", "src", "__pycache__"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join(".git/config"), "x").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(root.join("__pycache__/m.pyc"), "x").unwrap();
        fs::write(root.join("src/b.py"), "x").unwrap();
        fs::write(root.join("src/a.py"), "x").unwrap();
        fs::write(root.join(".env"), "x").unwrap();

        let files = collect_files(root, &WalkOptions::default()).unwrap();
        assert_eq!(names(root, &files), vec![".env", "src/a.py", "src/b.py"]);
    }

    #[test]
    fn test_gitignore_is_opt_in() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "secret.txt\n").unwrap();
        fs::write(root.join("secret.txt"), "x").unwrap();

        let all = collect_files(root, &WalkOptions::default()).unwrap();
        assert_eq!(names(root, &all), vec![".gitignore", "secret.txt"]);

        let options = WalkOptions {
            respect_gitignore: true,
            ..WalkOptions::default()
        };
        let filtered = collect_files(root, &options).unwrap();
        assert_eq!(names(root, &filtered), vec![".gitignore"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_listed_once() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("real.txt"), "x").unwrap();
        fs::write(outside.path().join("shared.txt"), "x").unwrap();

        symlink(root.join("real.txt"), root.join("a_link.txt")).unwrap();
        symlink(outside.path().join("shared.txt"), root.join("external.txt")).unwrap();
        symlink(root.join("sub"), root.join("linked_dir")).unwrap();
        symlink(root.join("missing.txt"), root.join("dangling.txt")).unwrap();

        let files = collect_files(root, &WalkOptions::default()).unwrap();
        assert_eq!(names(root, &files), vec!["external.txt", "real.txt"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(collect_files(&temp_dir.path().join("nope"), &WalkOptions::default()).is_err());
    }
}
