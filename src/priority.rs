//! Ranking of candidate files that share a library name.

use camino::{Utf8Path, Utf8PathBuf};

/// Scores a candidate by its full path. Lower scores are preferred.
pub trait PriorityScorer {
    fn priority(&self, full_path: &Utf8Path) -> u32;
}

impl<F> PriorityScorer for F
where
    F: Fn(&Utf8Path) -> u32,
{
    fn priority(&self, full_path: &Utf8Path) -> u32 {
        self(full_path)
    }
}

/// Prefers files from search directories listed earlier.
///
/// The score is the position of the first root containing the path; files
/// outside every root score `u32::MAX`.
#[derive(Debug, Clone, Default)]
pub struct SearchOrderPriority {
    roots: Vec<Utf8PathBuf>,
}

impl SearchOrderPriority {
    pub fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self { roots }
    }
}

impl PriorityScorer for SearchOrderPriority {
    fn priority(&self, full_path: &Utf8Path) -> u32 {
        self.roots
            .iter()
            .position(|root| full_path.starts_with(root))
            .and_then(|pos| u32::try_from(pos).ok())
            .unwrap_or(u32::MAX)
    }
}
