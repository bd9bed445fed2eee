//! Terminal and JSON rendering for the `mcfn` subcommands.
//!
//! Diagnostics carry document-level character offsets, which is what
//! ariadne indexes by, so spans go straight into [`Report`]s. JSON output
//! goes to stdout; pretty diagnostics go to stderr so that data printed by a
//! command (formatted text, completions) stays on stdout.

use std::io::{self, IsTerminal};

use anyhow::Result;
use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use mcfunction_toolchain_core::{HoverInfo, Suggestion};
use mcfunction_toolchain_diagnostics::{Diagnostic, Severity};
use serde::Serialize;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for terminals and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn severity_word(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warn => "warning",
        Severity::Info => "info",
        _ => "diagnostic",
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Diagnostics ─────────────────────────────────────────────────────────

/// Render diagnostics against `source` to stderr.
///
/// Diagnostics without a span (file-level notices) are printed as a single
/// header line.
pub(crate) fn render_diagnostics_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    let len = source.chars().count();
    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let Some(span) = diag.span else {
            eprintln!("{}[{}]: {}", severity_word(diag.severity), diag.id, diag.message);
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);

        let label = context_note(diag).unwrap_or_else(|| diag.message.clone());
        let mut builder = Report::build(report_kind(diag.severity), (filename, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(label)
                    .with_color(severity_color(diag.severity)),
            );
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

/// Render diagnostics in the given format.
pub(crate) fn render_diagnostics(
    source: &str,
    filename: &str,
    diagnostics: &[Diagnostic],
    format: Format,
) -> Result<()> {
    match format {
        Format::Pretty => {
            render_diagnostics_pretty(source, filename, diagnostics);
            print_summary(diagnostics);
            Ok(())
        }
        Format::Json => print_json(diagnostics),
    }
}

/// Print a coloured summary line such as `2 errors, 1 warning`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let (mut errors, mut warnings, mut infos) = (0usize, 0usize, 0usize);
    for d in diagnostics {
        match d.severity {
            Severity::Error => errors += 1,
            Severity::Info => infos += 1,
            _ => warnings += 1,
        }
    }
    if errors + warnings + infos == 0 {
        return;
    }

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(format!(
            "{}",
            format!("{warnings} warning{s}").fg(Color::Yellow)
        ));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    eprintln!("{}", parts.join(", "));
}

// ── Editor queries ──────────────────────────────────────────────────────

/// One completion per line: text, then kind and description when present.
pub(crate) fn print_suggestions_pretty(suggestions: &[Suggestion]) {
    for s in suggestions {
        let mut line = s.display_label().to_string();
        if let Some(kind) = s.kind {
            line.push_str(&format!("  {}", format!("{kind:?}").to_lowercase().fg(Color::Cyan)));
        }
        if let Some(description) = &s.description {
            line.push_str(&format!("  {description}"));
        }
        println!("{line}");
    }
}

/// Hover contents, innermost first, each on its own line.
pub(crate) fn print_hover_pretty(hover: Option<&HoverInfo>) {
    match hover {
        Some(hover) => {
            for text in &hover.contents {
                println!("{text}");
            }
        }
        None => eprintln!("nothing to show here"),
    }
}
