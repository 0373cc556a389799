use anyhow::Context;
use bpaf::Bpaf;
use camino::Utf8PathBuf;
use depclosure::{
    BinaryFormat, BinaryInspector, DependencyScanner, Inspect, LibraryIndex, SearchPaths,
};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options)]
struct Options {
    #[bpaf(short, long)]
    /// Verbose output
    verbose: bool,

    #[bpaf(short('d'), long("dir"), argument("DIR"))]
    /// Directory to search for libraries, may be repeated
    dirs: Vec<Utf8PathBuf>,

    #[bpaf(short('f'), long("config"), argument("CONFIG"))]
    /// File listing search directories
    config_file: Option<Utf8PathBuf>,

    #[bpaf(short('r'), long, argument("PREFIX"))]
    /// Resolve absolute config entries under PREFIX (like chroot)
    prefix: Option<Utf8PathBuf>,

    #[bpaf(positional("TARGET"))]
    /// Executable or library to resolve
    target: Utf8PathBuf,
}

/// Initialize the tracing subscriber with appropriate configuration
///
/// # Arguments
///
/// * `verbose` - If true, sets log level to DEBUG, otherwise INFO
pub fn init_logging(verbose: bool) {
    let filter_level = if verbose { Level::DEBUG } else { Level::INFO };

    // RUST_LOG overrides the default level
    let env_filter = EnvFilter::builder()
        .with_default_directive(filter_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_level(verbose)
        .with_target(verbose)
        .with_line_number(verbose)
        .without_time()
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    debug!("Logging initialized with level: {}", filter_level);
}

fn main() -> anyhow::Result<()> {
    let options = options().run();

    init_logging(options.verbose);

    let search_paths = search_paths(&options)?;
    debug!("Directories to scan: {:?}", &*search_paths);

    let index = LibraryIndex::build(&search_paths)
        .with_context(|| format!("Failed to index {} directories", search_paths.len()))?;
    info!(
        "Indexed {} libraries from {} directories",
        index.len(),
        index.roots().len()
    );

    let scanner = DependencyScanner::builder().index(index).build();
    let libs = scanner.scan_sorted(&options.target);

    if libs.is_empty() {
        warn!("No dependencies resolved for {}", options.target);
    }

    for lib in &libs {
        println!("{}", lib);
    }

    Ok(())
}

/// Explicit directories and config file entries, or, with neither given, the
/// target's own directory plus the platform's library search variable.
fn search_paths(options: &Options) -> anyhow::Result<SearchPaths> {
    let mut paths = SearchPaths::new(options.dirs.iter().cloned());

    if let Some(config) = &options.config_file {
        info!("Loading configuration from: {}", config);
        let from_file = SearchPaths::from_file(config, options.prefix.as_deref())
            .with_context(|| format!("Failed to load {}", config))?;
        paths.extend(from_file.iter().cloned());
    }

    if paths.is_empty() {
        // Fall back to the file name when the target cannot be read yet
        let windows = match BinaryInspector.inspect(&options.target) {
            Ok(info) => info.platform.is_windows(),
            Err(_) => BinaryFormat::classify(&options.target) == BinaryFormat::Pe,
        };
        let var = if windows { "PATH" } else { "LD_LIBRARY_PATH" };
        warn!("No search directories given, using target directory and {}", var);

        if let Some(parent) = options.target.parent() {
            let parent = if parent.as_str().is_empty() {
                Utf8PathBuf::from(".")
            } else {
                parent.to_owned()
            };
            paths.extend([parent]);
        }
        paths.extend(SearchPaths::from_env_var(var).iter().cloned());
    }

    Ok(paths)
}
