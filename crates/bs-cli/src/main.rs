//! CLI entry point for better-search.
//!
//! This binary indexes a directory tree by filename and answers keyword
//! queries against the index.
//!
//! # Usage
//!
//! ```bash
//! bsearch [OPTIONS] <COMMAND>
//!
//! # Build the index and print a summary
//! bsearch index --root /data
//!
//! # One-shot search
//! bsearch search --root /data report --whole-word --ignore-case
//!
//! # Interactive search while the index builds
//! bsearch shell --root /data
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::{self, BufRead, Write};

use bs_core::{Category, Config, MatchMode, SearchConfig, SearchQuery};
use bs_index::{BuildPhase, BuildReport, IndexBuild, IndexError, IndexHandle, Indexer};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Index a directory tree by filename and search it.
#[derive(Parser)]
#[command(name = "bsearch", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Directory to index.
    #[arg(short, long, global = true, env = "BSEARCH_ROOT", default_value = ".")]
    root: Utf8PathBuf,

    /// JSON configuration file.
    ///
    /// Keys left out of the file keep their defaults; flags override both.
    #[arg(short, long, global = true, env = "BSEARCH_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Number of walker threads.
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    /// Follow symbolic links while walking.
    #[arg(long, global = true)]
    follow_links: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build the index and print a summary.
    Index {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// Build the index and print the paths matching a keyword.
    Search {
        /// Text to look for in filenames. Empty matches everything.
        keyword: String,

        /// Only match the keyword as a whole word.
        #[arg(short, long)]
        whole_word: bool,

        /// Match regardless of case.
        #[arg(short, long)]
        ignore_case: bool,

        /// Only return files of this category.
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        /// Maximum number of results.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// Index in the background and answer queries from stdin.
    Shell,
}

/// Output format for one-shot commands.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    Plain,
    /// JSON document.
    Json,
}

/// Extension categories accepted by `--category`.
#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    /// Audio files.
    Audio,
    /// Archives.
    Compressed,
    /// Documents and spreadsheets.
    Documents,
    /// Executables and scripts.
    Executables,
    /// Images.
    Picture,
    /// Videos.
    Video,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Audio => Self::Audio,
            CategoryArg::Compressed => Self::Compressed,
            CategoryArg::Documents => Self::Documents,
            CategoryArg::Executables => Self::Executables,
            CategoryArg::Picture => Self::Picture,
            CategoryArg::Video => Self::Video,
        }
    }
}

/// Query flags of the `search` command.
#[derive(Clone, Copy)]
struct QueryFlags {
    whole_word: bool,
    ignore_case: bool,
    category: Option<CategoryArg>,
    limit: Option<usize>,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default. Logs go
/// to stderr so results on stdout stay pipeable.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional config file and CLI flags.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or an option is out
/// of range.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            Config::from_json_file(path)?
        }
        None => Config::default(),
    };

    if let Some(threads) = cli.threads {
        config.index.threads = threads;
    }
    if cli.follow_links {
        config.index.follow_links = true;
    }

    config.validate()?;
    Ok(config)
}

/// Turns a keyword and the `search` flags into a query, starting from the
/// configured defaults.
fn build_query(keyword: &str, flags: QueryFlags, defaults: &SearchConfig) -> SearchQuery {
    let mut query = SearchQuery::from_config(keyword, defaults);
    if flags.whole_word {
        query = query.with_mode(MatchMode::WholeWord);
    }
    if flags.ignore_case {
        query = query.with_case_sensitive(false);
    }
    if let Some(category) = flags.category {
        query = query.with_category(category.into());
    }
    if flags.limit.is_some() {
        query = query.with_limit(flags.limit);
    }
    query
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Waits for a build on a blocking thread, cancelling it on Ctrl-C.
///
/// # Errors
///
/// Returns the build error, including [`IndexError::Cancelled`] after Ctrl-C.
async fn wait_for_build(build: IndexBuild) -> color_eyre::Result<BuildReport> {
    let token = build.cancellation_token();
    let mut worker = tokio::task::spawn_blocking(move || build.wait());

    let result = tokio::select! {
        joined = &mut worker => joined?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, cancelling index build");
            token.cancel();
            worker.await?
        }
    };

    Ok(result?)
}

/// Builds the index and prints a summary.
///
/// # Errors
///
/// Returns an error if the build fails or output cannot be written.
async fn run_index(root: &Utf8Path, config: &Config, format: OutputFormat) -> color_eyre::Result<()> {
    let build = Indexer::new(config.index.clone())?.spawn(root)?;
    let report = wait_for_build(build).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_report(&mut out, &report)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
    }
    Ok(())
}

/// Builds the index and prints the results of one query.
///
/// # Errors
///
/// Returns an error if the build fails or output cannot be written.
async fn run_search(
    root: &Utf8Path,
    config: &Config,
    keyword: &str,
    flags: QueryFlags,
    format: OutputFormat,
) -> color_eyre::Result<()> {
    let build = Indexer::new(config.index.clone())?.spawn(root)?;
    let handle = build.handle().clone();
    wait_for_build(build).await?;

    let query = build_query(keyword, flags, &config.search);
    let results = handle.search_query(&query);
    info!(keyword, results = results.len(), "Search finished");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_results(&mut out, keyword, &results)?,
        OutputFormat::Json => write_json_results(&mut out, &query, &results)?,
    }
    Ok(())
}

/// Starts a background build and answers queries from stdin until `exit`
/// or end of input.
///
/// # Errors
///
/// Returns an error if the build cannot start or the terminal fails.
async fn run_shell(root: &Utf8Path, config: &Config) -> color_eyre::Result<()> {
    let build = Indexer::new(config.index.clone())?.spawn(root)?;
    let handle = build.handle().clone();
    let token = build.cancellation_token();
    let waiter = tokio::task::spawn_blocking(move || build.wait());

    let defaults = config.search;
    let repl = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let stdout = io::stdout();
        read_eval_print(&mut stdin.lock(), &mut stdout.lock(), &handle, &defaults)
    });
    let session = repl.await?;

    // Leaving the shell ends the pass too.
    token.cancel();
    match waiter.await? {
        Ok(_) | Err(IndexError::Cancelled) => {}
        Err(err) => warn!(error = %err, "Index build failed"),
    }

    session
}

/// The interactive loop of the `shell` command.
///
/// Every query sees the index as it is at that moment; while the build is
/// still running, the prompt says how far it got.
fn read_eval_print(
    input: &mut impl BufRead,
    out: &mut impl Write,
    handle: &IndexHandle,
    defaults: &SearchConfig,
) -> color_eyre::Result<()> {
    writeln!(out, "Indexing {} in the background. You can search right away.", handle.root())?;

    let mut line = String::new();
    loop {
        match handle.phase() {
            BuildPhase::Failed => {
                writeln!(out, "\n(indexing {} failed, see the log for details)", handle.root())?;
            }
            phase if !phase.is_finished() => {
                writeln!(
                    out,
                    "\n(index is {phase}, {} entries so far)",
                    handle.stats().entries
                )?;
            }
            _ => {}
        }
        write!(out, "\nEnter search keyword (or type 'exit' to quit): ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let keyword = line.trim_end_matches(['\r', '\n']);
        if keyword == "exit" {
            break;
        }

        let results = handle.search_query(&SearchQuery::from_config(keyword, defaults));
        write_results(&mut *out, keyword, &results)?;
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Writes numbered results, or a "nothing found" line.
fn write_results(out: &mut impl Write, keyword: &str, results: &[Utf8PathBuf]) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "No files found matching \"{keyword}\"");
    }

    writeln!(out, "\nSearch Results:")?;
    for (i, path) in results.iter().enumerate() {
        writeln!(out, "{}. {path}", i + 1)?;
    }
    Ok(())
}

/// Writes the query and its results as one JSON document.
fn write_json_results(
    out: &mut impl Write,
    query: &SearchQuery,
    results: &[Utf8PathBuf],
) -> color_eyre::Result<()> {
    #[derive(serde::Serialize)]
    struct Output<'a> {
        query: &'a SearchQuery,
        count: usize,
        results: &'a [Utf8PathBuf],
    }

    let output = Output {
        query,
        count: results.len(),
        results,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

/// Writes a summary of a finished build.
fn write_report(out: &mut impl Write, report: &BuildReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Index Summary")?;
    writeln!(out, "=============")?;
    writeln!(out)?;
    writeln!(out, "Root:            {}", report.root)?;
    writeln!(out, "Entries indexed: {}", report.stats.entries)?;
    writeln!(out, "Distinct names:  {}", report.names)?;
    writeln!(out, "Skipped entries: {}", report.stats.skipped_entries)?;
    writeln!(out, "Skipped dirs:    {}", report.stats.skipped_subtrees)?;
    writeln!(out, "Elapsed:         {:.2?}", report.elapsed)?;

    if !report.skipped.is_empty() {
        writeln!(out)?;
        writeln!(out, "Skipped ({}):", report.skipped.len())?;
        for skip in &report.skipped {
            writeln!(out, "  {} - {}", skip.kind.label(), skip.message)?;
        }
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Merge config file and flags
    let config = build_config(&cli)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Index { format } => run_index(&cli.root, &config, *format).await,
        Commands::Search {
            keyword,
            whole_word,
            ignore_case,
            category,
            limit,
            format,
        } => {
            let flags = QueryFlags {
                whole_word: *whole_word,
                ignore_case: *ignore_case,
                category: *category,
                limit: *limit,
            };
            run_search(&cli.root, &config, keyword, flags, *format).await
        }
        Commands::Shell => run_shell(&cli.root, &config).await,
    }
}
