use crate::patterns::{TEXT_EXTENSIONS, normalize_extension};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::trace;

/// Number of leading bytes inspected when a file has no extension.
const SNIFF_LEN: u64 = 1024;

/// Decides whether a candidate path is a text file worth processing.
///
/// Files with an allow-listed extension are accepted without being opened.
/// Files without an extension are accepted when their first kilobyte decodes
/// as UTF-8. Everything else is rejected.
#[derive(Debug, Clone)]
pub struct Classifier {
    extensions: HashSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(TEXT_EXTENSIONS)
    }
}

impl Classifier {
    /// Creates a classifier with a custom extension allow-list.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_text(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().to_lowercase();
                self.extensions.contains(&ext)
            }
            None => sniff_utf8(path),
        }
    }
}

/// Reads up to `SNIFF_LEN` bytes and checks they are valid UTF-8.
///
/// A multi-byte sequence cut off by the length limit does not count as invalid.
/// Open and read failures are reported as "not text".
fn sniff_utf8(path: &Path) -> bool {
    let mut prefix = Vec::with_capacity(SNIFF_LEN as usize);
    let read = File::open(path).and_then(|f| f.take(SNIFF_LEN).read_to_end(&mut prefix));
    if let Err(e) = read {
        trace!(path = %path.display(), error = %e, "cannot sniff file");
        return false;
    }

    match std::str::from_utf8(&prefix) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && prefix.len() as u64 == SNIFF_LEN,
    }
}
