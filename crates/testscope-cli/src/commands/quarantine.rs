use std::path::Path;

use clap::{Arg, ArgMatches, Command};
use testscope::{CatalogSource, quarantine_entry, resolve_by_name};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util::{display_path, require_non_empty};

pub fn command() -> Command {
    Command::new("quarantine")
        .about("Mark a test as quarantined in its source file")
        .arg(
            Arg::new("name")
                .value_name("NAME")
                .required(true)
                .help("Fully-qualified test name as printed by ginkgo"),
        )
        .arg(
            Arg::new("dir")
                .long("dir")
                .value_name("DIR")
                .default_value(".")
                .help("Directory holding the test suite"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let name = matches
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_default();
    require_non_empty(&name, "NAME")?;
    let dir = matches
        .get_one::<String>("dir")
        .map(String::as_str)
        .unwrap_or(".");

    let catalog = session.catalogs.catalog(Path::new(dir))?;
    let entry = resolve_by_name(&catalog, &name, &session.config.matching)?;
    let changed = quarantine_entry(entry)?;

    Ok(CommandResult::Quarantined {
        name: entry.full_name(),
        file: display_path(&entry.file),
        changed,
    })
}
