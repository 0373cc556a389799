//! Index of candidate library files found in the search directories.

use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use glob::MatchOptions;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace, warn};

/// File name patterns collected from every search directory.
const LIBRARY_PATTERNS: [&str; 4] = ["*.dll", ".DLL", "*.SO*", "*.so*"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Maps an uppercased library file name to every file of that name found in
/// the search directories, in search order.
///
/// Built once and read-only afterwards, so it can be shared by any number of
/// scans.
#[derive(Debug, Clone, Default)]
pub struct LibraryIndex {
    entries: HashMap<String, Vec<Utf8PathBuf>>,
    roots: Vec<Utf8PathBuf>,
}

impl LibraryIndex {
    /// Index the libraries directly inside each of `dirs`.
    ///
    /// Directories that do not exist are skipped. Subdirectories are not
    /// descended into.
    pub fn build<P: AsRef<Utf8Path>>(dirs: &[P]) -> Result<Self, Error> {
        let mut index = Self::default();

        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                debug!("Skipping missing search directory {}", dir);
                continue;
            }

            let root = absolute(dir.as_std_path())?;
            for path in list_libraries(&root)? {
                let Some(name) = path.file_name() else {
                    continue;
                };
                trace!("Indexed {}", path);
                index
                    .entries
                    .entry(name.to_uppercase())
                    .or_default()
                    .push(path);
            }
            index.roots.push(root);
        }

        debug!(
            "Indexed {} library names from {} directories",
            index.entries.len(),
            index.roots.len()
        );

        Ok(index)
    }

    /// Every indexed file called `name`, compared case-insensitively.
    pub fn lookup(&self, name: &str) -> &[Utf8PathBuf] {
        self.entries
            .get(&name.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Existing search directories, absolute, in the order they were given.
    pub fn roots(&self) -> &[Utf8PathBuf] {
        &self.roots
    }

    /// Number of distinct library names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Regular files in `dir` matching any of the library patterns, each once,
/// sorted by path.
fn list_libraries(dir: &Utf8Path) -> Result<BTreeSet<Utf8PathBuf>, Error> {
    let escaped = glob::Pattern::escape(dir.as_str());
    let mut found = BTreeSet::new();

    for pattern in LIBRARY_PATTERNS {
        let full = format!("{}/{}", escaped.trim_end_matches('/'), pattern);
        for entry in glob::glob_with(&full, MATCH_OPTIONS)? {
            match entry {
                Ok(path) if path.is_file() => match Utf8PathBuf::try_from(path) {
                    Ok(path) => {
                        found.insert(path);
                    }
                    Err(e) => debug!("Skipping non UTF-8 path {}", e.as_path().display()),
                },
                Ok(_) => {}
                Err(e) => warn!("Failed to read entry in {}: {}", dir, e),
            }
        }
    }

    Ok(found)
}

pub(crate) fn absolute(path: &std::path::Path) -> Result<Utf8PathBuf, Error> {
    let path = std::path::absolute(path)?;
    Utf8PathBuf::try_from(path).map_err(|e| Error::NonUtf8Path(e.into_path_buf()))
}
