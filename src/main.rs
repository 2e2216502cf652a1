use clap::Parser;

use imgfe::cli::{self, CliArgs};
use imgfe::logger;

fn main() -> std::process::ExitCode {
    let args = CliArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init(args.log_file.as_deref());

    cli::run(args)
}
