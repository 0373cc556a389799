//! Library metadata shared by the index, the inspectors and the closure walk.

use camino::Utf8PathBuf;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Operating system and architecture a binary was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Win32,
    Win64,
    WinArm64,
    Unix32,
    Unix64,
    UnixArm32,
    UnixArm64,
}

impl Platform {
    pub fn is_windows(self) -> bool {
        matches!(self, Platform::Win32 | Platform::Win64 | Platform::WinArm64)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Win32 => "win32",
            Platform::Win64 => "win64",
            Platform::WinArm64 => "win-arm64",
            Platform::Unix32 => "unix32",
            Platform::Unix64 => "unix64",
            Platform::UnixArm32 => "unix-arm32",
            Platform::UnixArm64 => "unix-arm64",
        };
        f.write_str(name)
    }
}

/// One binary artifact found on disk.
///
/// A `LibInfo` only exists fully populated: inspectors return it whole or
/// fail. Equality and hashing use `full_path` alone, so two records for the
/// same file are the same library no matter how they were reached.
#[derive(Debug, Clone)]
pub struct LibInfo {
    pub name: String,
    pub full_path: Utf8PathBuf,
    pub platform: Platform,
    /// Library names this binary requires, in declaration order.
    pub dependencies: Vec<String>,
    /// Lower wins when ranking candidates.
    pub priority: u32,
}

impl LibInfo {
    /// Create a record for `full_path`, naming it after the file.
    pub fn new(full_path: Utf8PathBuf, platform: Platform, dependencies: Vec<String>) -> Self {
        let name = full_path
            .file_name()
            .unwrap_or(full_path.as_str())
            .to_string();
        Self {
            name,
            full_path,
            platform,
            dependencies,
            priority: 0,
        }
    }
}

impl PartialEq for LibInfo {
    fn eq(&self, other: &Self) -> bool {
        self.full_path == other.full_path
    }
}

impl Eq for LibInfo {}

impl Hash for LibInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_path.hash(state);
    }
}

impl fmt::Display for LibInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.platform, self.full_path)
    }
}
