//! Search directory configuration.
//!
//! A config file lists one directory per line. Blank lines and `#` comments
//! are ignored, and `include <glob>` pulls in every matching `*.conf` file.

use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use std::ops::Deref;
use tracing::{debug, warn};

/// Ordered list of directories to index, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    dirs: Vec<Utf8PathBuf>,
}

impl SearchPaths {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        let mut paths = Self::default();
        paths.extend(dirs);
        paths
    }

    /// Load directories from a config file.
    ///
    /// With a `prefix`, absolute entries and include patterns are resolved
    /// beneath it, like a chroot.
    pub fn from_file(path: &Utf8Path, prefix: Option<&Utf8Path>) -> Result<Self, Error> {
        let mut paths = Self::default();
        let mut visited = HashSet::new();
        paths.load_file(path, prefix, &mut visited)?;
        Ok(paths)
    }

    /// Directories from a `PATH`-style environment variable. Unset or non
    /// UTF-8 variables give an empty list.
    pub fn from_env_var(name: &str) -> Self {
        let Some(value) = std::env::var_os(name) else {
            return Self::default();
        };

        Self::new(
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .filter_map(|p| Utf8PathBuf::try_from(p).ok()),
        )
    }

    /// Append directories not already present.
    pub fn extend<I, P>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        for dir in dirs {
            let dir = dir.into();
            if !self.dirs.contains(&dir) {
                self.dirs.push(dir);
            }
        }
    }

    fn load_file(
        &mut self,
        path: &Utf8Path,
        prefix: Option<&Utf8Path>,
        visited: &mut HashSet<Utf8PathBuf>,
    ) -> Result<(), Error> {
        if !visited.insert(path.to_owned()) {
            debug!("Skipping already included config {}", path);
            return Ok(());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {}: {}", path, e)))?;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();

            if line.is_empty() {
                continue;
            }

            if let Some(pattern) = line.strip_prefix("include ") {
                let pattern = resolve(pattern.trim(), path, prefix);
                for included in expand_include(&pattern)? {
                    self.load_file(&included, prefix, visited)?;
                }
            } else {
                self.extend([apply_prefix(Utf8Path::new(line), prefix)]);
            }
        }

        Ok(())
    }
}

impl Deref for SearchPaths {
    type Target = [Utf8PathBuf];

    fn deref(&self) -> &Self::Target {
        &self.dirs
    }
}

fn apply_prefix(path: &Utf8Path, prefix: Option<&Utf8Path>) -> Utf8PathBuf {
    match prefix {
        Some(prefix) if path.is_absolute() => {
            prefix.join(path.strip_prefix("/").unwrap_or(path))
        }
        _ => path.to_owned(),
    }
}

/// Relative include patterns are relative to the including file.
fn resolve(pattern: &str, including: &Utf8Path, prefix: Option<&Utf8Path>) -> Utf8PathBuf {
    let pattern = Utf8Path::new(pattern);
    if pattern.is_absolute() {
        apply_prefix(pattern, prefix)
    } else {
        including
            .parent()
            .map(|dir| dir.join(pattern))
            .unwrap_or_else(|| pattern.to_owned())
    }
}

fn expand_include(pattern: &Utf8Path) -> Result<Vec<Utf8PathBuf>, Error> {
    let mut files = Vec::new();

    for entry in glob::glob(pattern.as_str())? {
        match entry {
            Ok(path) => {
                if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("conf") {
                    files.push(
                        Utf8PathBuf::try_from(path)
                            .map_err(|e| Error::NonUtf8Path(e.into_path_buf()))?,
                    );
                }
            }
            Err(e) => {
                warn!("Failed to process include pattern {}: {}", pattern, e);
            }
        }
    }

    files.sort();
    Ok(files)
}
