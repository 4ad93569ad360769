use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "testscope";

pub fn run() -> ExitCode {
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses CLI arguments, loads the configuration and dispatches to the selected command.
/// Returns a `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;
    init_tracing(default_log_level(&matches));

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let config_path = matches.get_one::<String>("config").cloned();
    let session = CliSession::bootstrap(config_path, verbosity)?;
    if session.verbosity.verbose {
        tracing::info!(
            config = %session
                .config_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<defaults>".into()),
            git = %session.config.tools.git,
            ginkgo = %session.config.tools.ginkgo,
            ripgrep = %session.config.tools.ripgrep,
            hash_prefix_len = ?session.config.matching.hash_prefix_len,
            "resolved session configuration"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

/// `RUST_LOG` still wins; the flags only move the default level.
fn init_tracing(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_log_level(matches: &ArgMatches) -> LevelFilter {
    let debug = matches
        .subcommand_matches("changed")
        .is_some_and(|sub| sub.get_flag("debug"));
    if debug {
        LevelFilter::DEBUG
    } else if matches.get_flag("verbose") {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Root `clap::Command` tree: global flags plus `changed`, `find` and `quarantine`.
fn build_cli() -> Command {
    Command::new(NAME)
        .about("Find the ginkgo tests a change touches, and locate tests by name")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("YAML configuration file with matching options and tool paths."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log the resolved configuration and collaborator calls."),
        )
        .subcommand_required(true)
        .subcommand(commands::changed::command())
        .subcommand(commands::find::command())
        .subcommand(commands::quarantine::command())
        .subcommand(commands::schema::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("changed", sub)) => commands::changed::run(session, sub),
        Some(("find", sub)) => commands::find::run(session, sub),
        Some(("quarantine", sub)) => commands::quarantine::run(session, sub),
        Some(("schema", sub)) => commands::schema::run(sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}
