//! Turning a required library name into ranked candidate files.

use crate::index::LibraryIndex;
use crate::info::{LibInfo, Platform};
use crate::inspect::Inspect;
use crate::priority::PriorityScorer;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Candidates for one library name, grouped by priority in ascending order.
/// Candidates sharing a priority keep index order.
#[derive(Debug, Clone, Default)]
pub struct RankedCandidates {
    by_priority: BTreeMap<u32, Vec<LibInfo>>,
}

impl RankedCandidates {
    pub fn insert(&mut self, info: LibInfo) {
        self.by_priority.entry(info.priority).or_default().push(info);
    }

    /// All candidates, most preferred first.
    pub fn iter(&self) -> impl Iterator<Item = &LibInfo> {
        self.by_priority.values().flatten()
    }

    /// The most preferred candidate built for `platform`.
    pub fn best_for(&self, platform: Platform) -> Option<&LibInfo> {
        self.iter().find(|info| info.platform == platform)
    }

    pub fn len(&self) -> usize {
        self.by_priority.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_priority.is_empty()
    }
}

/// Looks library names up in a [`LibraryIndex`] and inspects each hit.
pub struct CandidateResolver<'a> {
    index: &'a LibraryIndex,
    inspector: &'a dyn Inspect,
    scorer: &'a dyn PriorityScorer,
}

impl<'a> CandidateResolver<'a> {
    pub fn new(
        index: &'a LibraryIndex,
        inspector: &'a dyn Inspect,
        scorer: &'a dyn PriorityScorer,
    ) -> Self {
        Self {
            index,
            inspector,
            scorer,
        }
    }

    /// Rank every usable file called `lib_name`.
    ///
    /// Files that fail inspection are logged and left out. An empty result
    /// means nothing usable was found.
    pub fn resolve(&self, lib_name: &str) -> RankedCandidates {
        let mut ranked = RankedCandidates::default();

        for path in self.index.lookup(lib_name) {
            let mut info = match self.inspector.inspect(path) {
                Ok(info) => info,
                Err(e) => {
                    warn!(
                        "Failed to extract library info from {} ({}): {}",
                        path, lib_name, e
                    );
                    continue;
                }
            };

            info.priority = self.scorer.priority(&info.full_path);
            trace!(
                "Candidate {} for {} with priority {}",
                info.full_path,
                lib_name,
                info.priority
            );
            ranked.insert(info);
        }

        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use camino::{Utf8Path, Utf8PathBuf};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dirs: Vec<TempDir>,
        roots: Vec<Utf8PathBuf>,
    }

    /// One temporary search directory per entry, each holding the given files.
    fn fixture(layout: &[&[&str]]) -> Fixture {
        let mut dirs = Vec::new();
        let mut roots = Vec::new();
        for files in layout {
            let dir = TempDir::new().unwrap();
            let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
            for name in *files {
                fs::write(root.join(name), b"").unwrap();
            }
            dirs.push(dir);
            roots.push(root);
        }
        Fixture { _dirs: dirs, roots }
    }

    fn win64(path: &Utf8Path) -> Result<LibInfo, Error> {
        Ok(LibInfo::new(path.to_owned(), Platform::Win64, Vec::new()))
    }

    #[test]
    fn lower_priority_comes_first() {
        let fx = fixture(&[&["zlib1.dll"], &["zlib1.dll"]]);
        let index = LibraryIndex::build(&fx.roots).unwrap();
        let second = fx.roots[1].clone();
        // Rank the later directory ahead of the earlier one.
        let scorer = move |path: &Utf8Path| -> u32 {
            if path.starts_with(&second) {
                1
            } else {
                2
            }
        };

        let ranked = CandidateResolver::new(&index, &win64, &scorer).resolve("ZLIB1.DLL");

        let order: Vec<_> = ranked.iter().map(|i| (i.priority, i.full_path.clone())).collect();
        assert_eq!(
            order,
            vec![
                (1, fx.roots[1].join("zlib1.dll")),
                (2, fx.roots[0].join("zlib1.dll")),
            ]
        );
    }

    #[test]
    fn equal_priorities_keep_index_order() {
        let fx = fixture(&[&["zlib1.dll"], &["zlib1.dll"]]);
        let index = LibraryIndex::build(&fx.roots).unwrap();
        let scorer = |_: &Utf8Path| -> u32 { 0 };

        let ranked = CandidateResolver::new(&index, &win64, &scorer).resolve("zlib1.dll");

        assert_eq!(ranked.len(), 2);
        let paths: Vec<_> = ranked.iter().map(|i| i.full_path.clone()).collect();
        assert_eq!(
            paths,
            vec![fx.roots[0].join("zlib1.dll"), fx.roots[1].join("zlib1.dll")]
        );
    }

    #[test]
    fn failed_inspection_skips_only_that_candidate() {
        let fx = fixture(&[&["zlib1.dll"], &["zlib1.dll"]]);
        let index = LibraryIndex::build(&fx.roots).unwrap();
        let broken = fx.roots[0].clone();
        let inspector = move |path: &Utf8Path| {
            if path.starts_with(&broken) {
                Err(Error::UnknownFormat(path.to_owned()))
            } else {
                win64(path)
            }
        };
        let scorer = |_: &Utf8Path| -> u32 { 0 };

        let ranked = CandidateResolver::new(&index, &inspector, &scorer).resolve("zlib1.dll");

        assert_eq!(ranked.len(), 1);
        assert!(ranked.iter().all(|i| i.full_path.starts_with(&fx.roots[1])));
    }

    #[test]
    fn unknown_name_is_empty() {
        let fx = fixture(&[&["zlib1.dll"]]);
        let index = LibraryIndex::build(&fx.roots).unwrap();
        let scorer = |_: &Utf8Path| -> u32 { 0 };

        let ranked = CandidateResolver::new(&index, &win64, &scorer).resolve("Qt5Core.dll");

        assert!(ranked.is_empty());
        assert!(ranked.best_for(Platform::Win64).is_none());
    }

    #[test]
    fn best_for_skips_other_platforms() {
        let mut ranked = RankedCandidates::default();
        let mut x86 = LibInfo::new("/a/zlib1.dll".into(), Platform::Win32, Vec::new());
        x86.priority = 0;
        let mut x64 = LibInfo::new("/b/zlib1.dll".into(), Platform::Win64, Vec::new());
        x64.priority = 5;
        ranked.insert(x64);
        ranked.insert(x86);

        assert_eq!(ranked.iter().next().unwrap().platform, Platform::Win32);
        let best = ranked.best_for(Platform::Win64).unwrap();
        assert_eq!(best.full_path.as_str(), "/b/zlib1.dll");
        assert!(ranked.best_for(Platform::Unix64).is_none());
    }
}
