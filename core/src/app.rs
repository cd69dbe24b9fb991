//! Application related stuff

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

lazy_static! {
    /// The global application options.
    pub static ref OPTIONS: Options = Options::parse();
}

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Number of threads to use for sampling.
    #[arg(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 1,
        help = "Use specified number of threads for selection sampling."
    )]
    n_threads: usize,

    /// Number of selections to draw per expression.
    #[arg(
        long = "samples",
        short = 's',
        value_name = "NUM",
        default_value_t = 0,
        help = "Draw the given number of stochastic selections per expression and print a histogram."
    )]
    pub samples: usize,

    /// Seed for the random number generators.
    #[arg(long, value_name = "NUM", help = "Seed the random number generators.")]
    pub seed: Option<u64>,

    /// Entry budget per composite.
    #[arg(
        long = "max-closures",
        value_name = "NUM",
        help = "Limit the number of entries per composite (capped at the compiled capacity)."
    )]
    pub max_closures: Option<usize>,

    /// Payload byte budget per composite.
    #[arg(
        long = "max-pool-size",
        value_name = "BYTES",
        help = "Limit the payload bytes per composite (capped at the compiled capacity)."
    )]
    pub max_pool_size: Option<usize>,

    /// Closure expressions given on the command line.
    #[arg(
        long = "expr",
        short = 'e',
        value_name = "EXPR",
        help = "Closure tree expression to inspect. May be repeated."
    )]
    pub exprs: Vec<String>,

    /// Input file paths, one expression per line. Empty with no `--expr` implies read from stdin.
    #[arg(help = "Input files")]
    pub paths: Vec<String>,

    /// List registered closures and exit.
    #[arg(long, help = "List the registered closures and their parameters.")]
    pub list: bool,

    /// Print statistics.
    #[arg(long, help = "Print statistics after processing.")]
    pub stats: bool,

    /// Suppress all text output other than error messages.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => {
                warn!("Invalid nthreads");
                1
            }
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }
}

/// Returns a progress bar for `len` steps, hidden when `quiet` is set.
///
/// * `len`   - Total number of steps.
/// * `quiet` - Suppress output.
pub fn create_progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    ProgressBar::new(len).with_style(style)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
