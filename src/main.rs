use clap::Parser;
use fxseason::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
