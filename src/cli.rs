// ============================================================================
// ImgFE CLI: run image-editing scripts from files or standard input
// ============================================================================
//
// Usage examples:
//   ImgFE edits.txt                        (run one script)
//   ImgFE -s "scripts/*.txt" --verbose     (run every match, one shared session)
//   ImgFE < commands.txt                   (read commands from stdin)
//   ImgFE                                  (interactive: type commands, `q` to quit)
//
// All scripts given on the command line share one session cache, so a later
// script can use images loaded by an earlier one.

use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{CodecOptions, DEFAULT_JPEG_QUALITY};
use crate::script::{DEFAULT_MAX_DEPTH, RunSummary, RunnerConfig, ScriptRunner};
use crate::{log_info, log_warn};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// ImgFE scripted image editor.
#[derive(Parser, Debug)]
#[command(
    name = "ImgFE",
    version,
    about = "Scripted raster image editor",
    long_about = "Run image-editing scripts. Each line names a command followed by its\n\
                  arguments, e.g. `load photo.ppm photo` or `blur photo soft`.\n\
                  Without script arguments, commands are read from standard input.\n\n\
                  Example:\n  \
                  ImgFE edits.txt\n  \
                  ImgFE -s \"scripts/*.txt\" --verbose"
)]
pub struct CliArgs {
    /// Script file(s) to run in order. Glob patterns accepted.
    #[arg(value_name = "SCRIPT")]
    pub scripts: Vec<String>,

    /// Additional script file(s) or glob patterns, run after positional ones.
    #[arg(short, long = "script", value_name = "PATTERN", num_args = 1..)]
    pub script: Vec<String>,

    /// Maximum nesting depth of `run` commands.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, value_name = "N")]
    pub max_depth: usize,

    /// JPEG quality used by `save` (1-100).
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100), value_name = "1-100")]
    pub quality: u8,

    /// Write the session log here instead of the platform data directory.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Echo each executed command and print a summary at the end.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Library-side settings derived from the arguments.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            max_depth: self.max_depth.max(1),
            echo: self.verbose,
            codec: CodecOptions {
                jpeg_quality: self.quality,
            },
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all scripts and return an OS exit code.
/// `0` = no errors were reported, `1` = at least one command failed.
pub fn run(args: CliArgs) -> ExitCode {
    let patterns: Vec<String> = args.scripts.iter().chain(&args.script).cloned().collect();
    let inputs = resolve_inputs(&patterns);
    if !patterns.is_empty() && inputs.is_empty() {
        eprintln!("error: no script files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    let start = Instant::now();
    let stdout = io::stdout();
    let mut runner = ScriptRunner::new(stdout.lock(), args.runner_config());

    let result = if inputs.is_empty() {
        log_info!("reading commands from standard input");
        runner.run_reader("<stdin>", BufReader::new(io::stdin()))
    } else {
        run_files(&mut runner, &inputs)
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log_info!(
        "session finished: {} executed, {} skipped, {} failed, {} image(s) cached",
        summary.executed,
        summary.skipped,
        summary.failed,
        runner.cache().len()
    );
    if args.verbose {
        let (cache, mut out) = runner.into_parts();
        let written = writeln!(
            out,
            "{} executed, {} skipped, {} failed ({:.0}ms)",
            summary.executed,
            summary.skipped,
            summary.failed,
            start.elapsed().as_secs_f64() * 1000.0
        )
        .and_then(|()| writeln!(out, "cached: {}", cache.names().join(", ")));
        if let Err(e) = written {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if summary.failed > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Run each file in turn in the same session, stopping early on `quit`.
fn run_files<W: Write>(runner: &mut ScriptRunner<W>, inputs: &[PathBuf]) -> crate::error::Result<RunSummary> {
    let mut summary = runner.summary();
    for path in inputs {
        summary = runner.run_file(path)?;
        if summary.quit {
            break;
        }
    }
    Ok(summary)
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        // Literal paths go through even when missing so the runner reports them.
        if as_path.exists() || !is_glob(pattern) {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    log_warn!("pattern '{}' matched no files", pattern);
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
