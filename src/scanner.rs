//! Transitive dependency closure of a root binary.

use crate::index::LibraryIndex;
use crate::info::LibInfo;
use crate::inspect::{BinaryInspector, Inspect};
use crate::priority::{PriorityScorer, SearchOrderPriority};
use crate::resolver::CandidateResolver;
use bon::bon;
use camino::Utf8Path;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Walks the libraries a binary needs, resolving each declared name to a
/// file in the [`LibraryIndex`] built for the same platform.
///
/// ```no_run
/// use camino::Utf8Path;
/// use depclosure::{DependencyScanner, LibraryIndex};
///
/// let index = LibraryIndex::build(&["C:/Qt/5.15.2/msvc2019_64/bin"])?;
/// let scanner = DependencyScanner::builder().index(index).build();
/// for lib in scanner.scan_sorted(Utf8Path::new("build/app.exe")) {
///     println!("{}", lib.full_path);
/// }
/// # Ok::<(), depclosure::Error>(())
/// ```
pub struct DependencyScanner {
    index: LibraryIndex,
    inspector: Box<dyn Inspect>,
    scorer: Box<dyn PriorityScorer>,
}

#[bon]
impl DependencyScanner {
    /// `inspector` defaults to [`BinaryInspector`], `scorer` to
    /// [`SearchOrderPriority`] over the index's search directories.
    #[builder]
    pub fn new(
        index: LibraryIndex,
        inspector: Option<Box<dyn Inspect>>,
        scorer: Option<Box<dyn PriorityScorer>>,
    ) -> Self {
        let inspector = inspector.unwrap_or_else(|| Box::new(BinaryInspector));
        let scorer = scorer
            .unwrap_or_else(|| Box::new(SearchOrderPriority::new(index.roots().to_vec())));

        Self {
            index,
            inspector,
            scorer,
        }
    }

    /// Every library reachable from `root`, each once, the root excluded.
    ///
    /// Returns an empty set when `root` itself cannot be inspected.
    /// Dependencies that cannot be resolved are logged and skipped.
    pub fn scan(&self, root: &Utf8Path) -> HashSet<LibInfo> {
        let mut result = HashSet::new();

        let root_info = match self.inspector.inspect(root) {
            Ok(info) => info,
            Err(e) => {
                warn!("Failed to extract library info from {}: {}", root, e);
                return result;
            }
        };

        debug!(
            "Scanning {} ({}) with {} direct dependencies",
            root_info.full_path,
            root_info.platform,
            root_info.dependencies.len()
        );

        let resolver =
            CandidateResolver::new(&self.index, self.inspector.as_ref(), self.scorer.as_ref());
        Walk {
            resolver: &resolver,
            root: &root_info.full_path,
            root_canonical: fs::canonicalize(&root_info.full_path).ok(),
            result: &mut result,
        }
        .visit(&root_info);

        debug!("Resolved {} libraries for {}", result.len(), root_info.name);
        result
    }

    /// [`scan`](Self::scan), sorted by full path.
    pub fn scan_sorted(&self, root: &Utf8Path) -> Vec<LibInfo> {
        let mut libs: Vec<_> = self.scan(root).into_iter().collect();
        libs.sort_by(|a, b| a.full_path.cmp(&b.full_path));
        libs
    }
}

struct Walk<'a, 'r> {
    resolver: &'a CandidateResolver<'r>,
    root: &'a Utf8Path,
    /// Catches the root reached through a symlinked directory.
    root_canonical: Option<PathBuf>,
    result: &'a mut HashSet<LibInfo>,
}

impl Walk<'_, '_> {
    /// Depth first: each newly found library is walked before the next
    /// sibling name is resolved.
    fn visit(&mut self, lib: &LibInfo) {
        for name in &lib.dependencies {
            let candidates = self.resolver.resolve(name);
            if candidates.is_empty() {
                warn!("Library for dependency {} of {} not found", name, lib.name);
                continue;
            }

            let Some(dep) = candidates.best_for(lib.platform) else {
                warn!(
                    "Library for dependency {} of {} not found for platform {}",
                    name, lib.name, lib.platform
                );
                continue;
            };

            if self.result.contains(dep) || self.is_root(dep) {
                continue;
            }

            debug!("{} -> {}", lib.name, dep.full_path);
            self.result.insert(dep.clone());
            self.visit(dep);
        }
    }

    fn is_root(&self, dep: &LibInfo) -> bool {
        if dep.full_path.as_path() == self.root {
            return true;
        }
        self.root_canonical.as_ref().is_some_and(|root| {
            fs::canonicalize(&dep.full_path).is_ok_and(|path| &path == root)
        })
    }
}
