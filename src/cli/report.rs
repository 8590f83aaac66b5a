//! Report formatting and printing utilities.
//!
//! Diagnostics are printed in cargo style. Kept apart from the core so
//! jsxlate can be used as a library.

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::ExtractResult;
use crate::issues::{Diagnostic, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print every diagnostic of a run, then the problem count.
pub fn report(result: &ExtractResult) {
    report_to(result, &mut io::stdout().lock());
}

/// Print diagnostics to a custom writer.
pub fn report_to<W: Write>(result: &ExtractResult, writer: &mut W) {
    let mut diagnostics: Vec<&Diagnostic> = result
        .files
        .iter()
        .flat_map(|file| file.diagnostics.errors.iter().chain(&file.diagnostics.warnings))
        .collect();
    if diagnostics.is_empty() {
        return;
    }
    diagnostics.sort_by(|a, b| a.location.cmp(&b.location).then(a.severity.cmp(&b.severity)));

    let max_line_width = diagnostics
        .iter()
        .map(|d| d.location.line)
        .max()
        .map_or(1, |line| line.to_string().len());

    for diagnostic in &diagnostics {
        print_diagnostic(diagnostic, writer, max_line_width);
    }
    print_problem_count(&diagnostics, writer);
}

/// Print what was extracted and where it went.
pub fn print_extract_summary(result: &ExtractResult, output: Option<&Path>) {
    print_extract_summary_to(result, output, &mut io::stdout().lock());
}

pub fn print_extract_summary_to<W: Write>(
    result: &ExtractResult,
    output: Option<&Path>,
    writer: &mut W,
) {
    let units = result.units().count();
    let files = result.files.len();
    let mut message = format!(
        "Extracted {} translation {} from {} source {}",
        units,
        if units == 1 { "unit" } else { "units" },
        files,
        if files == 1 { "file" } else { "files" }
    );
    if let Some(output) = output {
        message.push_str(&format!(" into {}", output.display()));
    }
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), message.green());
}

fn print_diagnostic<W: Write>(diagnostic: &Diagnostic, writer: &mut W, max_line_width: usize) {
    let severity = match diagnostic.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };
    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity,
        diagnostic.message,
        diagnostic.rule.to_string().dimmed().cyan()
    );
    let _ = writeln!(writer, "  {} {}", "-->".blue(), diagnostic.location);

    let location = &diagnostic.location;
    if let Some(source_line) = &diagnostic.source_line
        && !location.is_file_scoped()
    {
        let caret = match diagnostic.severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
        };
        let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            location.line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // col is 1-based and counts display width
        let prefix: String = source_line.chars().take(location.col.saturating_sub(1)).collect();
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret,
            width = max_line_width,
            padding = UnicodeWidthStr::width(prefix.as_str())
        );
    }

    let _ = writeln!(writer);
}

fn print_problem_count<W: Write>(diagnostics: &[&Diagnostic], writer: &mut W) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    let _ = writeln!(
        writer,
        "{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        diagnostics.len(),
        errors,
        if errors == 1 { "error" } else { "errors" }.red(),
        warnings,
        if warnings == 1 { "warning" } else { "warnings" }.yellow()
    );
}
