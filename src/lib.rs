// depclosure - shared library closure resolution for deployment
// MIT, 2025

//! Resolves every shared library a PE or ELF binary transitively needs, so
//! a deployment tool can ship them next to the application.
//!
//! Candidate libraries are indexed once from a list of search directories.
//! Each required library name is then resolved to the best ranked candidate
//! built for the same platform as the binary that requires it.
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use depclosure::{DependencyScanner, LibraryIndex, SearchPaths};
//!
//! let paths = SearchPaths::from_file(Utf8Path::new("deploy.conf"), None)?;
//! let index = LibraryIndex::build(&paths)?;
//! let scanner = DependencyScanner::builder().index(index).build();
//!
//! for lib in scanner.scan(Utf8Path::new("/opt/app/bin/app")) {
//!     println!("{} ({})", lib.full_path, lib.platform);
//! }
//! # Ok::<(), depclosure::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod index;
pub mod info;
pub mod inspect;
pub mod priority;
pub mod resolver;
pub mod scanner;

pub use config::SearchPaths;
pub use error::Error;
pub use format::BinaryFormat;
pub use index::LibraryIndex;
pub use info::{LibInfo, Platform};
pub use inspect::{parse_elf_file, parse_pe_file, BinaryInspector, Inspect};
pub use priority::{PriorityScorer, SearchOrderPriority};
pub use resolver::{CandidateResolver, RankedCandidates};
pub use scanner::DependencyScanner;
