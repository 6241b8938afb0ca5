//! The `pasc` binary: argument parsing, logging setup, exit status.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pasc_drv::{Config, Session};

/// Pascal to three-address code compiler.
#[derive(Parser, Debug)]
#[command(name = "pasc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles a Pascal dialect to textual three-address code", long_about = None)]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Write TAC to this file instead of stdout.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Emit phase markers to stderr before each phase.
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging: level from `RUST_LOG`, output on stderr so stdout
/// stays pure TAC.
fn init_logging() {
    let filter = EnvFilter::from_default_env();
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let session = Session::new(Config {
        input: cli.input,
        output: cli.output,
        verbose: cli.verbose,
    });

    match session.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
