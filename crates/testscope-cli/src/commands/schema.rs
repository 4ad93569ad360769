use clap::{Arg, ArgMatches, Command};
use testscope::{changed_paths_schema, test_names_schema};

use crate::commands::CommandResult;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("schema")
        .about("Print the JSON Schema of a file written by `changed`")
        .arg(
            Arg::new("output")
                .value_name("OUTPUT")
                .value_parser(["names", "paths"])
                .default_value("paths")
                .help("Which output file to describe"),
        )
}

pub fn run(matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let output = matches
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| "paths".to_string());
    let schema = match output.as_str() {
        "names" => test_names_schema(),
        _ => changed_paths_schema(),
    };
    Ok(CommandResult::Schema {
        output,
        schema: serde_json::to_value(schema)?,
    })
}
