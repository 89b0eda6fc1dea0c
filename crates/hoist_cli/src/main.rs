//! hoist: run a script through the scope evaluator.
//!
//! Usage:
//!   hoist [options] <file>
//!
//! `console.log` output goes to stdout. Logs and error reports go to stderr.

mod report;

use clap::Parser as ClapParser;
use hoist_evaluator::StdoutConsole;
use hoist_options::{parse_options_file, EvalOptions, HoistConfig, OptionsError, MAX_CALL_DEPTH_CEILING};
use hoist_runner::Program;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Looked up in the working directory when `--config` is absent.
const CONFIG_FILE: &str = "hoist.json";

#[derive(ClapParser, Debug)]
#[command(name = "hoist", about = "hoist - a lexical scope and variable lifecycle evaluator", version)]
struct Cli {
    /// Script to run.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Global function to call after the top level completes.
    #[arg(short, long)]
    entry: Option<String>,

    /// Path to hoist.json.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate the whole script in strict mode.
    #[arg(long)]
    strict: bool,

    /// Maximum nested call depth.
    #[arg(
        long = "max-call-depth",
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CALL_DEPTH_CEILING))
    )]
    max_call_depth: Option<u32>,

    /// Log scope, hoisting and closure events to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    process::exit(run(&cli));
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(report::stderr_is_terminal())
        .with_target(false);
    tracing_subscriber::registry().with(filter).with(stderr_layer).init();
}

fn run(cli: &Cli) -> i32 {
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => apply_overrides(config, cli),
        Err(e) => {
            report::print_error(&e.to_string());
            return 1;
        }
    };
    let use_color = config
        .eval_options
        .console_colors()
        .unwrap_or_else(report::stderr_is_terminal);
    report::install_hook(use_color);

    let mut program = match Program::load(&cli.file, config.eval_options) {
        Ok(program) => program,
        Err(e) => {
            report::print_error(&format!("cannot read '{}': {}", cli.file.display(), e));
            return 1;
        }
    };
    program.entry = config.entry;

    match program.run(StdoutConsole) {
        Ok(()) => 0,
        Err(e) => {
            report::print_run_error(&program, &e);
            e.exit_code()
        }
    }
}

/// `--config` if given, else `./hoist.json` if present, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<HoistConfig, OptionsError> {
    match explicit {
        Some(path) => parse_options_file(path),
        None if Path::new(CONFIG_FILE).exists() => parse_options_file(CONFIG_FILE),
        None => Ok(HoistConfig::default()),
    }
}

/// Command-line flags override the file.
fn apply_overrides(mut config: HoistConfig, cli: &Cli) -> HoistConfig {
    config.eval_options.merge(&EvalOptions {
        strict: cli.strict.then_some(true),
        max_call_depth: cli.max_call_depth,
        console_colors: None,
    });
    if cli.entry.is_some() {
        config.entry = cli.entry.clone();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_options::parse_options;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from(["hoist", "lesson.js", "--strict", "--max-call-depth", "32", "-e", "main"]).unwrap();
        let config = parse_options(r#"{ "evalOptions": { "strict": false, "maxCallDepth": 8 }, "entry": "start" }"#).unwrap();
        let config = apply_overrides(config, &cli);
        assert_eq!(
            config.eval_options,
            EvalOptions {
                strict: Some(true),
                max_call_depth: Some(32),
                console_colors: None,
            }
        );
        assert_eq!(config.entry.as_deref(), Some("main"));
    }

    #[test]
    fn test_config_kept_without_flags() {
        let cli = Cli::try_parse_from(["hoist", "lesson.js"]).unwrap();
        let config = parse_options(r#"{ "evalOptions": { "maxCallDepth": 8 }, "entry": "start" }"#).unwrap();
        let config = apply_overrides(config, &cli);
        assert_eq!(config.eval_options.max_call_depth(), 8);
        assert_eq!(config.entry.as_deref(), Some("start"));
    }

    #[test]
    fn test_call_depth_flag_bounded() {
        let ceiling = MAX_CALL_DEPTH_CEILING.to_string();
        let cli = Cli::try_parse_from(["hoist", "lesson.js", "--max-call-depth", ceiling.as_str()]).unwrap();
        assert_eq!(cli.max_call_depth, Some(MAX_CALL_DEPTH_CEILING));

        let above = (MAX_CALL_DEPTH_CEILING + 1).to_string();
        assert!(Cli::try_parse_from(["hoist", "lesson.js", "--max-call-depth", above.as_str()]).is_err());
        assert!(Cli::try_parse_from(["hoist", "lesson.js", "--max-call-depth", "0"]).is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let path = std::env::temp_dir().join("hoist-cli-tests-missing").join("hoist.json");
        assert!(matches!(load_config(Some(&path)), Err(OptionsError::Io { .. })));
    }
}
