// Error types for depclosure
use camino::Utf8PathBuf;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Binary parsing error: {0}")]
    Goblin(#[from] goblin::error::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Unrecognized binary format: {0}")]
    UnknownFormat(Utf8PathBuf),

    #[error("Unsupported architecture 0x{machine:x} in {path}")]
    UnsupportedArchitecture { path: Utf8PathBuf, machine: u16 },

    #[error("Invalid UTF-8 in path: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),
}
