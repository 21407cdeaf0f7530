use std::process;

use vulnmerge::cli::Args;
use vulnmerge::config::{self, RunConfig};
use vulnmerge::error::{ExitCode, Result};
use vulnmerge::pipeline;

fn main() {
    if let Err(e) = run() {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

fn run() -> Result<()> {
    let args = Args::parse_args();

    // Explicit config path wins; otherwise discover one next to the caller.
    let config_file = match &args.config {
        Some(path) => Some(config::load_config_from_path(path)?),
        None => config::discover_config(std::path::Path::new("."))?,
    };

    let run_config = RunConfig::resolve(&args, config_file)?;
    pipeline::run(&run_config, args.stage)
}
