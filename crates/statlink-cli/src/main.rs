//! CLI for statlink — conformance runs against serial windowed-statistics
//! devices.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "statlink")]
#[command(about = "statlink — conformance harness for serial windowed-statistics devices")]
#[command(version = statlink_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a conformance test against the device on a serial port
    Run {
        /// Serial port path (e.g. /dev/ttyACM0)
        #[arg(long)]
        port: String,

        /// Generate this many synthetic random samples
        #[arg(long, conflicts_with = "vector")]
        count: Option<usize>,

        /// Vector file with samples and an optional sending schedule
        #[arg(long)]
        vector: Option<String>,

        /// Baud rate
        #[arg(long, default_value_t = 115_200)]
        baud: u32,

        /// Samples per tumbling window
        #[arg(long, default_value_t = 100)]
        window: usize,

        /// Absolute tolerance floor for element comparison
        #[arg(long, default_value_t = 1e-3)]
        abs_tol: f64,

        /// Relative tolerance for element comparison
        #[arg(long, default_value_t = 1e-4)]
        rel_tol: f64,

        /// Expect bias-corrected sample skewness instead of the population moment
        #[arg(long)]
        corrected_skewness: bool,

        /// Pace the stream: bytes per chunk (overrides any vector schedule)
        #[arg(long, requires = "wait")]
        chunk: Option<usize>,

        /// Seconds to wait after each paced chunk
        #[arg(long, requires = "chunk")]
        wait: Option<f64>,

        /// Print every compared element, not only mismatches
        #[arg(long)]
        all: bool,

        /// Write the structured verdict as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Print the oracle's expected values for a vector file (no device)
    Check {
        /// Vector file path
        vector: String,

        /// Samples per tumbling window
        #[arg(long, default_value_t = 100)]
        window: usize,

        /// Use bias-corrected sample skewness
        #[arg(long)]
        corrected_skewness: bool,
    },

    /// Generate a synthetic vector file
    Gen {
        /// Number of non-sentinel samples
        #[arg(long)]
        count: usize,

        /// Output path (stdout when omitted)
        #[arg(long)]
        out: Option<String>,

        /// Uniform schedule: bytes per chunk
        #[arg(long, requires = "wait")]
        chunk: Option<usize>,

        /// Seconds between chunks
        #[arg(long, requires = "chunk")]
        wait: Option<f64>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            port,
            count,
            vector,
            baud,
            window,
            abs_tol,
            rel_tol,
            corrected_skewness,
            chunk,
            wait,
            all,
            output,
        } => commands::run::run(commands::run::RunCommandConfig {
            port: &port,
            count,
            vector: vector.as_deref(),
            chunk,
            wait,
            show_all: all,
            output: output.as_deref(),
            harness: commands::harness_config(window, baud, abs_tol, rel_tol, corrected_skewness),
        }),
        Commands::Check {
            vector,
            window,
            corrected_skewness,
        } => commands::check::run(
            &vector,
            &commands::harness_config(window, 115_200, 1e-3, 1e-4, corrected_skewness),
        ),
        Commands::Gen {
            count,
            out,
            chunk,
            wait,
        } => commands::generate::run(count, out.as_deref(), chunk, wait),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
