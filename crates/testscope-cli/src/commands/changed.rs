use clap::{Arg, ArgAction, ArgMatches, Command};
use testscope::{ChangeInputs, ChangeRequest, validate_revision_range};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util::{display_path, write_json};

const DEFAULT_REVISION_RANGE: &str = "main..HEAD";

pub fn command() -> Command {
    Command::new("changed")
        .about("List the ginkgo tests touched by the commits of a revision range")
        .arg(
            Arg::new("revision-range")
                .long("revision-range")
                .short('r')
                .value_name("RANGE")
                .default_value(DEFAULT_REVISION_RANGE)
                .help("Git revision range whose commits are inspected"),
        )
        .arg(
            Arg::new("repo-path")
                .long("repo-path")
                .short('p')
                .value_name("PATH")
                .default_value(".")
                .help("Path to the git repository"),
        )
        .arg(
            Arg::new("test-subdirectory")
                .long("test-subdirectory")
                .short('t')
                .value_name("DIR")
                .help("Test directory in the repository, where the dry-run runs"),
        )
        .arg(
            Arg::new("output-names-path")
                .long("output-names-path")
                .short('o')
                .value_name("FILE")
                .help("JSON file for the test names (default: changed-tests-*.json)"),
        )
        .arg(
            Arg::new("output-paths-path")
                .long("output-paths-path")
                .short('O')
                .value_name("FILE")
                .help("JSON file for the outline paths (default: changed-test-paths-*.json)"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('D')
                .action(ArgAction::SetTrue)
                .help("Dump the gathered commits, outlines, blame and file contents to temp files"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let range = matches
        .get_one::<String>("revision-range")
        .map(String::as_str)
        .unwrap_or(DEFAULT_REVISION_RANGE);
    validate_revision_range(range)?;

    let repo = matches
        .get_one::<String>("repo-path")
        .map(String::as_str)
        .unwrap_or(".");
    let subdir = matches
        .get_one::<String>("test-subdirectory")
        .map(String::as_str)
        .unwrap_or_default();
    let request = ChangeRequest::new(range, repo).with_test_subdirectory(subdir);

    let detector = session.detector();
    let inputs = detector.collect(&request)?;
    let debug_files = if matches.get_flag("debug") {
        dump_inputs(&inputs)?
    } else {
        Vec::new()
    };

    let report = detector.report(&inputs, &request.test_dir())?;

    let names_path = write_json(
        matches.get_one::<String>("output-names-path").map(String::as_str),
        "changed-tests-",
        &report.test_names,
    )?;
    tracing::info!(path = %names_path.display(), "test name output written");
    let paths_path = write_json(
        matches.get_one::<String>("output-paths-path").map(String::as_str),
        "changed-test-paths-",
        &report.paths,
    )?;
    tracing::info!(path = %paths_path.display(), "test path output written");

    Ok(CommandResult::ChangedTests {
        revision_range: request.revision_range,
        path_count: report.paths.len(),
        test_names: report.test_names,
        names_path: display_path(&names_path),
        paths_path: display_path(&paths_path),
        debug_files,
    })
}

fn dump_inputs(inputs: &ChangeInputs) -> Result<Vec<String>, CliError> {
    let files = [
        write_json(None, "commits-", &inputs.commits)?,
        write_json(None, "outlines-", &inputs.outlines)?,
        write_json(None, "blame-lines-", &inputs.blame)?,
        write_json(None, "testfile-contents-", &inputs.contents)?,
    ];
    for file in &files {
        tracing::debug!(path = %file.display(), "debug input written");
    }
    Ok(files.iter().map(|file| display_path(file)).collect())
}
