//! Rendering run failures as `miette` reports.

use hoist_diagnostics::Diagnostic as ParseDiagnostic;
use hoist_runner::{Program, RunError};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};

/// An exception that escaped every `catch`.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{kind}: {message}")]
#[diagnostic(code(hoist::uncaught))]
pub struct UncaughtReport {
    kind: String,
    message: String,
    #[source_code]
    source_code: NamedSource<String>,
    #[label("raised here")]
    span: Option<SourceSpan>,
}

/// One parse diagnostic.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hoist::parse))]
pub struct ParseReport {
    message: String,
    #[source_code]
    source_code: NamedSource<String>,
    #[label]
    span: Option<SourceSpan>,
}

/// Install the report handler once, before anything is rendered.
pub fn install_hook(use_color: bool) {
    let installed = miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .color(use_color)
                .unicode(use_color)
                .build(),
        )
    }));
    if installed.is_err() {
        tracing::debug!("report handler already installed");
    }
}

fn named_source(program: &Program) -> NamedSource<String> {
    NamedSource::new(&program.file_name, program.source_text.clone())
}

fn parse_report(program: &Program, diagnostic: &ParseDiagnostic) -> ParseReport {
    ParseReport {
        message: format!("{} H{}: {}", diagnostic.category, diagnostic.code, diagnostic.message_text),
        source_code: named_source(program),
        span: diagnostic.span.map(|span| SourceSpan::from(program.byte_range(span))),
    }
}

/// Print `err` to stderr.
pub fn print_run_error(program: &Program, err: &RunError) {
    match err {
        RunError::Parse { diagnostics, .. } => {
            for diagnostic in diagnostics.diagnostics() {
                eprintln!("{:?}", Report::new(parse_report(program, diagnostic)));
            }
            let count = diagnostics.error_count();
            eprintln!("Found {} error{}.", count, if count == 1 { "" } else { "s" });
        }
        RunError::Uncaught { kind, message, span } => {
            let report = UncaughtReport {
                kind: kind.clone(),
                message: message.clone(),
                source_code: named_source(program),
                span: span.map(|span| SourceSpan::from(program.byte_range(span))),
            };
            eprintln!("{:?}", Report::new(report));
        }
        other => print_error(&other.to_string()),
    }
}

const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print an error that has no source location.
pub fn print_error(msg: &str) {
    if stderr_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn stderr_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_evaluator::BufferConsole;
    use hoist_options::EvalOptions;

    #[test]
    fn test_parse_report_points_at_bytes() {
        let program = Program::new("bad.js", "let s = \"é\"; var x = ;", EvalOptions::default());
        let diagnostics = program.check();
        let diagnostic = &diagnostics.diagnostics()[0];
        let report = parse_report(&program, diagnostic);
        assert!(report.message.starts_with("error H"));
        let span = report.span.unwrap();
        assert_eq!(&program.source_text[span.offset()..span.offset() + span.len()], ";");
    }

    #[test]
    fn test_uncaught_report_message() {
        let program = Program::new("lesson.js", "console.log(name);", EvalOptions::default());
        let err = program.run(BufferConsole::new()).unwrap_err();
        let RunError::Uncaught { kind, message, .. } = err else {
            panic!("expected an uncaught error");
        };
        let report = UncaughtReport {
            kind,
            message,
            source_code: named_source(&program),
            span: None,
        };
        assert_eq!(report.to_string(), "ReferenceError: name is not defined");
    }
}
