mod datapack;
mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mcfunction_toolchain_command_data::{GlobalData, persist};
use mcfunction_toolchain_config::{Config, load_config_from_str};
use mcfunction_toolchain_core::{Analyzer, CommandData, Document};
use mcfunction_toolchain_diagnostics::{self as diag, Diagnostic, Severity};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::render::{
    Format, print_hover_pretty, print_json, print_suggestions_pretty, render_diagnostics,
};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "mcfn",
    version,
    about = "mcfunction toolchain: check, complete, and format Minecraft function files"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Command data: a cache directory written by `mcfn cache write`, or a
    /// single JSON file. Falls back to `cache_dir` from the config.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Path to a JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── File analysis ───────────────────────────────────────────────
    /// Report diagnostics for a function file (exit 1 on errors).
    Check { file: PathBuf },

    /// List completions at a cursor position.
    Complete {
        file: PathBuf,
        /// 1-based line number.
        #[arg(long)]
        line: usize,
        /// 1-based column, in characters.
        #[arg(long)]
        col: usize,
    },

    /// Show hover text at a cursor position.
    Hover {
        file: PathBuf,
        /// 1-based line number.
        #[arg(long)]
        line: usize,
        /// 1-based column, in characters.
        #[arg(long)]
        col: usize,
    },

    // ── File transformation ─────────────────────────────────────────
    /// Rewrite structured data values in their canonical form.
    Format {
        file: PathBuf,
        /// Write formatted output back to the file (in-place).
        #[arg(long, short, conflicts_with = "check")]
        write: bool,
        /// Check if the file is already formatted (exit 1 if not). For CI.
        #[arg(long, conflicts_with = "write")]
        check: bool,
    },

    // ── Command data ────────────────────────────────────────────────
    /// Manage the on-disk command data cache.
    Cache {
        #[command(subcommand)]
        action: CacheCmd,
    },

    // ── Reference ───────────────────────────────────────────────────
    /// Explain a diagnostic ID (e.g. MCF1201).
    Explain { id: String },
}

#[derive(Subcommand, Debug)]
enum CacheCmd {
    /// Store a command data JSON file as a cache directory.
    Write {
        /// JSON file holding the command tree, registries and version info.
        source: PathBuf,
        /// Target directory (defaults to `cache_dir` from the config).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Summarize the contents of a cache directory.
    Read {
        /// Cache directory (defaults to `cache_dir` from the config).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);
    let format = Format::resolve_or_detect(cli.output.as_deref());
    let data = cli.data.as_deref();

    match cli.cmd {
        Cmd::Check { file } => cmd_check(&file, data, config, format)?,
        Cmd::Complete { file, line, col } => {
            cmd_complete(&file, line, col, data, config, format)?
        }
        Cmd::Hover { file, line, col } => cmd_hover(&file, line, col, data, config, format)?,
        Cmd::Format { file, write, check } => {
            cmd_format(&file, write, check, data, config, format)?
        }
        Cmd::Cache { action } => match action {
            CacheCmd::Write { source, dir } => {
                cmd_cache_write(&source, dir.as_deref(), &config, format)?
            }
            CacheCmd::Read { dir } => cmd_cache_read(dir.as_deref(), &config, format)?,
        },
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

/// Logs go to stderr. `RUST_LOG` wins over the config's `log.filter`.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_check(file: &Path, data: Option<&Path>, config: Config, format: Format) -> Result<()> {
    let (analyzer, mut doc) = open(file, data, config)?;
    let diagnostics = analyzer.diagnostics(&mut doc);
    let ok = !has_errors(&diagnostics);
    let name = file.display().to_string();

    match format {
        Format::Json => print_json(&serde_json::json!({
            "file": name,
            "ok": ok,
            "diagnostics": diagnostics,
        }))?,
        Format::Pretty => {
            render_diagnostics(&doc.text(), &name, &diagnostics, format)?;
            if ok {
                eprintln!("check ok");
            }
        }
    }

    if !ok {
        process::exit(1);
    }
    Ok(())
}

fn cmd_complete(
    file: &Path,
    line: usize,
    col: usize,
    data: Option<&Path>,
    config: Config,
    format: Format,
) -> Result<()> {
    let (analyzer, mut doc) = open(file, data, config)?;
    let (index, offset) = cursor(&doc, line, col)?;
    let suggestions = analyzer.suggestions_at(&mut doc, index, offset)?;
    match format {
        Format::Json => print_json(&serde_json::json!({
            "line": line,
            "col": col,
            "suggestions": suggestions,
        })),
        Format::Pretty => {
            print_suggestions_pretty(&suggestions);
            Ok(())
        }
    }
}

fn cmd_hover(
    file: &Path,
    line: usize,
    col: usize,
    data: Option<&Path>,
    config: Config,
    format: Format,
) -> Result<()> {
    let (analyzer, mut doc) = open(file, data, config)?;
    let (index, offset) = cursor(&doc, line, col)?;
    let hover = analyzer.hover_at(&mut doc, index, offset)?;
    match format {
        Format::Json => print_json(&serde_json::json!({
            "line": line,
            "col": col,
            "hover": hover,
        })),
        Format::Pretty => {
            print_hover_pretty(hover.as_ref());
            Ok(())
        }
    }
}

fn cmd_format(
    file: &Path,
    write: bool,
    check: bool,
    data: Option<&Path>,
    config: Config,
    format: Format,
) -> Result<()> {
    let input = read_source(file)?;
    let (analyzer, mut doc) = open_text(file, &input, data, config)?;
    let formatted = analyzer.format_document(&mut doc);
    let already_formatted = formatted == input;
    let name = file.display().to_string();

    if check {
        status_message(format, already_formatted, "already formatted", "not formatted", &name)?;
        if !already_formatted {
            process::exit(1);
        }
    } else if write {
        if !already_formatted {
            fs::write(file, &formatted)
                .with_context(|| format!("failed to write '{name}'"))?;
        }
        status_message(format, !already_formatted, "formatted", "already formatted", &name)?;
    } else {
        print!("{formatted}");
    }
    Ok(())
}

fn cmd_cache_write(
    source: &Path,
    dir: Option<&Path>,
    config: &Config,
    format: Format,
) -> Result<()> {
    let dir = cache_dir(dir, config)?;
    let global = persist::load_data_file(source)
        .with_context(|| format!("failed to load command data from '{}'", source.display()))?;
    persist::write_cache(dir, &global)
        .with_context(|| format!("failed to write cache to '{}'", dir.display()))?;
    status_message(format, true, "cache written", "", &dir.display().to_string())
}

fn cmd_cache_read(dir: Option<&Path>, config: &Config, format: Format) -> Result<()> {
    let dir = cache_dir(dir, config)?;
    let global = persist::read_cache(dir)
        .with_context(|| format!("failed to read cache from '{}'", dir.display()))?;
    let commands = global.commands.children.len();
    let registries = global.registries.as_ref().map_or(0, |r| r.len());
    let version = global.meta_info.as_ref().map(|m| m.version.as_str());
    match format {
        Format::Json => print_json(&serde_json::json!({
            "dir": dir.display().to_string(),
            "commands": commands,
            "registries": registries,
            "version": version,
        })),
        Format::Pretty => {
            println!(
                "{}: {commands} commands, {registries} registries, version {}",
                dir.display(),
                version.unwrap_or("unknown")
            );
            Ok(())
        }
    }
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(&serde_json::json!({
            "id": id,
            "explanation": diag::explain(id),
        }))?,
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    load_config_from_str(&text)
        .with_context(|| format!("invalid config file '{}'", path.display()))
}

fn cache_dir<'a>(explicit: Option<&'a Path>, config: &'a Config) -> Result<&'a Path> {
    explicit
        .or(config.cache_dir.as_deref())
        .context("no cache directory: pass --dir or set cache_dir in the config")
}

/// Command data from `--data` (directory or file), else the configured cache.
fn load_global(data: Option<&Path>, config: &Config) -> Result<GlobalData> {
    let path = data
        .or(config.cache_dir.as_deref())
        .context("no command data: pass --data <dir|file> or set cache_dir in the config")?;
    let global = if path.is_dir() {
        persist::read_cache(path)
    } else {
        persist::load_data_file(path)
    };
    global.with_context(|| format!("failed to load command data from '{}'", path.display()))
}

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("failed to read '{}'", file.display()))
}

fn open(file: &Path, data: Option<&Path>, config: Config) -> Result<(Analyzer, Document)> {
    let input = read_source(file)?;
    open_text(file, &input, data, config)
}

/// Analyzer over the command data plus the local data of the file's
/// datapack, and the file as a document.
fn open_text(
    file: &Path,
    input: &str,
    data: Option<&Path>,
    config: Config,
) -> Result<(Analyzer, Document)> {
    let global = load_global(data, &config)?;
    let local = datapack::data_dir_for(file).map(|dir| datapack::scan(&dir));
    debug!(file = %file.display(), local = local.is_some(), "opening document");
    let analyzer = Analyzer::new(Arc::new(CommandData::new(global, local)), config);
    Ok((analyzer, Document::new(Some(file.to_path_buf()), input)))
}

/// Convert a 1-based line/column into a line index and character offset.
fn cursor(doc: &Document, line: usize, col: usize) -> Result<(usize, usize)> {
    if line == 0 || col == 0 {
        bail!("--line and --col are 1-based");
    }
    let lines = diag::LineIndex::new(&doc.text());
    if lines.line_start(line - 1).is_none() {
        bail!("line {line} is past the end of the file ({} lines)", lines.line_count());
    }
    Ok((line - 1, col - 1))
}

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
}

/// Emit a status message for --check / --write in the appropriate format.
fn status_message(
    format: Format,
    condition: bool,
    if_true: &str,
    if_false: &str,
    target: &str,
) -> Result<()> {
    let msg = if condition { if_true } else { if_false };
    match format {
        Format::Json => print_json(&serde_json::json!({ "status": msg, "file": target })),
        Format::Pretty => {
            eprintln!("{msg}: {target}");
            Ok(())
        }
    }
}
