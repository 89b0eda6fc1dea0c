//! hoist_runner: Program orchestration.
//!
//! A `Program` owns one script's text and its evaluation options. Running it
//! parses the script, evaluates the top level, then calls the entry point if
//! one is configured. Evaluation happens on a dedicated thread with a large
//! stack, because the evaluator recurses once per nested call and
//! expression.

use hoist_core::intern::StringInterner;
use hoist_core::text::{LineMap, TextRange, TextSpan};
use hoist_core::ScriptArena;
use hoist_diagnostics::DiagnosticCollection;
use hoist_evaluator::{Console, Interpreter, InterpreterOptions};
use hoist_options::{EvalOptions, HoistConfig, MAX_CALL_DEPTH_CEILING};
use hoist_parser::parse_script;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info, warn};

/// Stack reserved for the evaluation thread.
pub const EVAL_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Native stack one script call may use, unoptimized builds included.
const STACK_PER_CALL: usize = 48 * 1024;

const _: () = assert!(MAX_CALL_DEPTH_CEILING as usize * STACK_PER_CALL <= EVAL_STACK_SIZE);

/// Why a program did not complete.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{file_name}: found {} error(s) while parsing", diagnostics.error_count())]
    Parse {
        file_name: String,
        diagnostics: DiagnosticCollection,
    },
    /// An exception no `catch` intercepted.
    #[error("{kind}: {message}")]
    Uncaught {
        kind: String,
        message: String,
        span: Option<TextSpan>,
    },
    #[error("cannot spawn the evaluation thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("the evaluation thread panicked")]
    Panicked,
}

impl RunError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Parse { .. } => 2,
            _ => 1,
        }
    }
}

/// One script plus everything needed to run it.
pub struct Program {
    pub file_name: String,
    pub source_text: String,
    pub options: EvalOptions,
    /// Global function called after the top level completes.
    pub entry: Option<String>,
}

impl Program {
    pub fn new(file_name: impl Into<String>, source_text: impl Into<String>, options: EvalOptions) -> Self {
        Self {
            file_name: file_name.into(),
            source_text: source_text.into(),
            options,
            entry: None,
        }
    }

    /// Build a program from a parsed `hoist.json`.
    pub fn from_config(file_name: impl Into<String>, source_text: impl Into<String>, config: HoistConfig) -> Self {
        Self {
            entry: config.entry,
            ..Self::new(file_name, source_text, config.eval_options)
        }
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    /// Read a script from disk.
    pub fn load(path: impl AsRef<Path>, options: EvalOptions) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let source_text = std::fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), source_text, options))
    }

    pub fn interpreter_options(&self) -> InterpreterOptions {
        if let Some(requested) = self.options.max_call_depth {
            if requested != self.options.max_call_depth() {
                warn!(requested, used = self.options.max_call_depth(), "call depth limit clamped");
            }
        }
        InterpreterOptions {
            strict: self.options.strict(),
            max_call_depth: self.options.max_call_depth(),
        }
    }

    /// Parse only, returning the diagnostics.
    pub fn check(&self) -> DiagnosticCollection {
        let arena = ScriptArena::new();
        let interner = StringInterner::new();
        let (_, diagnostics) = parse_script(arena.bump(), &interner, &self.file_name, &self.source_text);
        diagnostics
    }

    /// Run the program, sending `console.log` output to `console`.
    pub fn run(&self, console: impl Console + 'static) -> Result<(), RunError> {
        std::thread::scope(|scope| {
            let handle = std::thread::Builder::new()
                .name("hoist-eval".to_string())
                .stack_size(EVAL_STACK_SIZE)
                .spawn_scoped(scope, move || self.evaluate(Box::new(console)))
                .map_err(RunError::Spawn)?;
            handle.join().map_err(|_| RunError::Panicked)?
        })
    }

    fn evaluate(&self, console: Box<dyn Console>) -> Result<(), RunError> {
        let arena = ScriptArena::new();
        let interner = StringInterner::new();
        let (file, diagnostics) = parse_script(arena.bump(), &interner, &self.file_name, &self.source_text);
        if diagnostics.has_errors() {
            return Err(RunError::Parse {
                file_name: self.file_name.clone(),
                diagnostics,
            });
        }
        let file = arena.alloc(file);
        info!(file = %self.file_name, "evaluate script");

        let mut interpreter = Interpreter::new(interner, self.interpreter_options(), console);
        let uncaught = |exception: hoist_evaluator::Exception<'_>| RunError::Uncaught {
            kind: exception.kind_name(),
            message: exception.message(),
            span: exception.range.map(TextSpan::from),
        };
        interpreter.run_script(file).map_err(uncaught)?;

        if let Some(entry) = &self.entry {
            debug!(entry = %entry, "run entry point");
            interpreter.call_entry(entry).map_err(uncaught)?;
        }
        Ok(())
    }

    /// Byte range of a character span, for report rendering.
    pub fn byte_range(&self, span: TextSpan) -> Range<usize> {
        LineMap::new(&self.source_text).byte_range(TextRange::from(span))
    }

    /// 1-based `line:column` of a character span's start.
    pub fn location(&self, span: TextSpan) -> String {
        LineMap::new(&self.source_text).line_and_column_of(span.start).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_evaluator::BufferConsole;

    #[test]
    fn test_run_collects_output() {
        let console = BufferConsole::new();
        let program = Program::new("test.js", "let a = 1; console.log(a + 1);", EvalOptions::default());
        program.run(console.clone()).unwrap();
        assert_eq!(console.lines(), vec!["2"]);
    }

    #[test]
    fn test_parse_error_exit_code() {
        let program = Program::new("bad.js", "var x = ;", EvalOptions::default());
        let err = program.run(BufferConsole::new()).unwrap_err();
        assert!(matches!(err, RunError::Parse { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_uncaught_span_maps_to_bytes() {
        let source = "const s = \"é\";\nmissing;";
        let program = Program::new("test.js", source, EvalOptions::default());
        let err = program.run(BufferConsole::new()).unwrap_err();
        let RunError::Uncaught { kind, span: Some(span), .. } = &err else {
            panic!("expected a located uncaught error, got {err:?}");
        };
        assert_eq!(kind, "ReferenceError");
        assert_eq!(&source[program.byte_range(*span)], "missing");
        assert_eq!(program.location(*span), "2:1");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_runaway_recursion_with_oversized_limit_is_a_range_error() {
        let options = EvalOptions {
            max_call_depth: Some(200_000),
            ..EvalOptions::default()
        };
        let program = Program::new("test.js", "function down(n) { return down(n + 1); }\ndown(0);", options);
        assert_eq!(program.interpreter_options().max_call_depth, MAX_CALL_DEPTH_CEILING);
        let err = program.run(BufferConsole::new()).unwrap_err();
        let RunError::Uncaught { kind, message, .. } = &err else {
            panic!("expected an uncaught error, got {err:?}");
        };
        assert_eq!(kind, "RangeError");
        assert_eq!(message, "Maximum call stack size exceeded");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_options_flow_into_interpreter() {
        let options = EvalOptions {
            strict: Some(true),
            max_call_depth: Some(8),
            console_colors: None,
        };
        let program = Program::new("test.js", "", options);
        assert_eq!(
            program.interpreter_options(),
            InterpreterOptions {
                strict: true,
                max_call_depth: 8,
            }
        );
    }
}
