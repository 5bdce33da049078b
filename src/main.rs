use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;
use readbench::observability::{ConsoleFormat, ConsoleLog};
use readbench::{BenchConfig, ConfigOverride, RunOptions};
use std::path::PathBuf;
use tracing::Level;
use uuid::Uuid;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Clone, ValueEnum, Debug)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "readbench")]
#[command(version = "0.1.0")]
#[command(about = "Compare CSV reading libraries over a directory of files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (Info -> Debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Silence all console logs
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Console log format (text or json)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Hide the per-library progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark every registered library against the input directory
    Run {
        /// Optional YAML file with benchmark settings
        #[arg(short, long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// Directory holding the converted CSV files
        #[arg(long, value_name = "DIR")]
        input_dir: Option<PathBuf>,

        /// Where to write the results table
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Directory for the timestamped run log
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,

        /// Only run these libraries (repeatable)
        #[arg(short, long = "library", value_name = "NAME")]
        libraries: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let console = if cli.quiet {
        None
    } else {
        Some(ConsoleLog {
            format: match cli.log_format {
                LogFormat::Text => ConsoleFormat::Text,
                LogFormat::Json => ConsoleFormat::Json,
            },
            level: if cli.verbose { Level::DEBUG } else { Level::INFO },
        })
    };

    let run_id = Uuid::new_v4();

    match cli.command {
        Commands::Run {
            config,
            input_dir,
            output,
            log_dir,
            libraries,
        } => {
            let base = match config {
                Some(path) => BenchConfig::from_path(path)?,
                None => BenchConfig::default(),
            };
            let config = base.apply(ConfigOverride {
                input_dir,
                output,
                log_dir,
                libraries: Some(libraries),
            });

            let options = RunOptions {
                console,
                progress: !cli.no_progress && !cli.quiet,
            };
            // miette::Result renders the diagnostic on failure
            let report = readbench::execute_benchmark(&config, run_id, options)?;
            println!("\n{}", report);
        }
    }

    Ok(())
}
