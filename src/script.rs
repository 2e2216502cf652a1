// ============================================================================
// SCRIPT RUNNER: reads command lines from a stack of sources
// ============================================================================
//
// Lines come from the source on top of the stack. `run <path>` pushes a new
// file source; reaching the end of a source pops it and reading resumes in
// the parent at its next line. `q` / `quit` discards the whole stack.
//
// Errors never end the run: each one is reported on the output sink as
// `error: <source>:<line>: <message>` and reading continues. A script that
// cannot be read further, or whose `load` names an unreadable image file, is
// abandoned and its parent resumes.
// ============================================================================

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::command::{Command, Outcome, registry};
use crate::error::{EditError, Result};
use crate::io::CodecOptions;
use crate::session::SessionCache;
use crate::{log_err, log_info, log_warn};

/// Default limit on nested `run` directives.
pub const DEFAULT_MAX_DEPTH: usize = 16;

// ============================================================================
// Tokenizer
// ============================================================================

/// Split a line on whitespace. Single- or double-quoted text is kept as part
/// of one token with the quotes removed; an unclosed quote runs to the end of
/// the line.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// A classified script line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptLine {
    Blank,
    Comment,
    Quit,
    Help,
    Run(PathBuf),
    Command(Command),
}

impl ScriptLine {
    pub fn parse(line: &str) -> Result<ScriptLine> {
        if line.trim_start().starts_with('#') {
            return Ok(ScriptLine::Comment);
        }
        let tokens = tokenize(line);
        let Some((name, args)) = tokens.split_first() else {
            return Ok(ScriptLine::Blank);
        };
        match name.as_str() {
            "q" | "quit" => {
                expect_args(name, "", args, 0)?;
                Ok(ScriptLine::Quit)
            }
            "help" => {
                expect_args(name, "", args, 0)?;
                Ok(ScriptLine::Help)
            }
            "run" => {
                expect_args(name, " <path>", args, 1)?;
                Ok(ScriptLine::Run(PathBuf::from(&args[0])))
            }
            _ => Command::parse(name, args).map(ScriptLine::Command),
        }
    }
}

fn expect_args(name: &str, usage: &str, args: &[String], expected: usize) -> Result<()> {
    if args.len() == expected {
        return Ok(());
    }
    Err(EditError::Arity {
        command: name.to_string(),
        usage: format!("{name}{usage}"),
        expected,
        actual: args.len(),
    })
}

// ============================================================================
// Sources
// ============================================================================

/// One entry on the source stack.
struct ScriptSource {
    label: String,
    /// Canonical path for file sources; used to refuse recursive `run`.
    canonical: Option<PathBuf>,
    reader: Box<dyn BufRead>,
    line_no: usize,
}

impl ScriptSource {
    fn open(path: &Path) -> Result<Self> {
        let source_err = |source| EditError::Source {
            path: path.to_path_buf(),
            source,
        };
        let canonical = path.canonicalize().map_err(source_err)?;
        let file = File::open(path).map_err(source_err)?;
        Ok(Self {
            label: path.display().to_string(),
            canonical: Some(canonical),
            reader: Box::new(BufReader::new(file)),
            line_no: 0,
        })
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Settings for a script run.
#[derive(Clone, Copy, Debug)]
pub struct RunnerConfig {
    /// Maximum number of sources on the stack at once.
    pub max_depth: usize,
    /// Echo each executed command to the output sink.
    pub echo: bool,
    pub codec: CodecOptions,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            echo: false,
            codec: CodecOptions::default(),
        }
    }
}

/// Counters for a finished (or quit) run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands that completed and changed the cache or wrote a file.
    pub executed: usize,
    /// Single-image transforms skipped because their operand was not loaded.
    pub skipped: usize,
    /// Errors reported on the output sink.
    pub failed: usize,
    /// Whether the run ended with `q` / `quit`.
    pub quit: bool,
}

/// Executes script lines against a session cache, writing messages to `out`.
pub struct ScriptRunner<W: Write> {
    cache: SessionCache,
    sources: Vec<ScriptSource>,
    out: W,
    config: RunnerConfig,
    summary: RunSummary,
}

impl<W: Write> ScriptRunner<W> {
    pub fn new(out: W, config: RunnerConfig) -> Self {
        Self::with_cache(SessionCache::new(), out, config)
    }

    /// Continue a session with an existing cache.
    pub fn with_cache(cache: SessionCache, out: W, config: RunnerConfig) -> Self {
        Self {
            cache,
            sources: Vec::new(),
            out,
            config,
            summary: RunSummary::default(),
        }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn into_parts(self) -> (SessionCache, W) {
        (self.cache, self.out)
    }

    /// Run a script file, including any scripts it `run`s.
    pub fn run_file(&mut self, path: &Path) -> Result<RunSummary> {
        match ScriptSource::open(path) {
            Ok(source) => {
                log_info!("running script {}", source.label);
                self.sources.push(source);
            }
            Err(e) => {
                self.report("<args>", 0, &e)?;
                return Ok(self.summary);
            }
        }
        self.drain()
    }

    /// Run lines from an arbitrary reader (stdin, an in-memory script).
    pub fn run_reader(&mut self, label: &str, reader: impl BufRead + 'static) -> Result<RunSummary> {
        self.sources.push(ScriptSource {
            label: label.to_string(),
            canonical: None,
            reader: Box::new(reader),
            line_no: 0,
        });
        self.drain()
    }

    /// Read lines until the stack is empty or the script quits. Only a
    /// failure of the output sink itself is returned as an error.
    fn drain(&mut self) -> Result<RunSummary> {
        let mut line = String::new();
        while let Some(top) = self.sources.last_mut() {
            line.clear();
            match top.reader.read_line(&mut line) {
                Ok(0) => {
                    if let Some(done) = self.sources.pop() {
                        log_info!("finished script {}", done.label);
                    }
                    continue;
                }
                Ok(_) => top.line_no += 1,
                Err(source) => {
                    let label = top.label.clone();
                    let line_no = top.line_no;
                    self.sources.pop();
                    let err = EditError::Source {
                        path: PathBuf::from(&label),
                        source,
                    };
                    self.report(&label, line_no, &err)?;
                    continue;
                }
            }

            let (label, line_no) = (top.label.clone(), top.line_no);
            match ScriptLine::parse(&line) {
                Ok(parsed) => {
                    let loads_image = matches!(parsed, ScriptLine::Command(Command::Load { .. }));
                    if let Err(e) = self.dispatch(parsed) {
                        self.report(&label, line_no, &e)?;
                        // An unreadable image file ends the script that asked for it.
                        if loads_image && matches!(e, EditError::Source { .. }) {
                            self.sources.pop();
                            log_warn!("abandoned script {} after line {}", label, line_no);
                        }
                    }
                }
                Err(e) => self.report(&label, line_no, &e)?,
            }
            if self.summary.quit {
                break;
            }
        }
        Ok(self.summary)
    }

    fn dispatch(&mut self, line: ScriptLine) -> Result<()> {
        match line {
            ScriptLine::Blank | ScriptLine::Comment => Ok(()),
            ScriptLine::Quit => {
                let discarded = self.sources.len();
                self.sources.clear();
                self.summary.quit = true;
                log_info!("quit requested, {} source(s) discarded", discarded);
                Ok(())
            }
            ScriptLine::Help => self.print_help(),
            ScriptLine::Run(path) => self.push_script(&path),
            ScriptLine::Command(cmd) => {
                if self.config.echo {
                    writeln!(self.out, "> {}", cmd)?;
                }
                match cmd.execute(&mut self.cache, &self.config.codec)? {
                    Outcome::Skipped { .. } => self.summary.skipped += 1,
                    Outcome::Stored(_) | Outcome::Saved(_) => self.summary.executed += 1,
                }
                Ok(())
            }
        }
    }

    fn push_script(&mut self, path: &Path) -> Result<()> {
        if self.sources.len() >= self.config.max_depth {
            return Err(EditError::ScriptDepth(self.config.max_depth));
        }
        let source = ScriptSource::open(path)?;
        let active: HashSet<&PathBuf> = self
            .sources
            .iter()
            .filter_map(|s| s.canonical.as_ref())
            .collect();
        if let Some(canonical) = &source.canonical
            && active.contains(canonical)
        {
            return Err(EditError::RecursiveScript(path.to_path_buf()));
        }
        log_info!("running script {} (depth {})", source.label, self.sources.len() + 1);
        self.sources.push(source);
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(self.out, "commands:")?;
        for spec in registry() {
            writeln!(self.out, "  {}", spec.usage())?;
        }
        writeln!(self.out, "  run <path>")?;
        writeln!(self.out, "  help")?;
        writeln!(self.out, "  q | quit")?;
        Ok(())
    }

    fn report(&mut self, label: &str, line_no: usize, err: &EditError) -> Result<()> {
        self.summary.failed += 1;
        log_err!("{}:{}: {}", label, line_no, err);
        writeln!(self.out, "error: {}:{}: {}", label, line_no, err)?;
        Ok(())
    }
}
