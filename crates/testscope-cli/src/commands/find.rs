use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use testscope::{
    CatalogSource, MatchOptions, ScopeError, TextSearcher, find_test_file_by_name, has_test_id,
    resolve_by_id,
};

use crate::commands::CommandResult;
use crate::context::{CliSession, SearchBackend};
use crate::error::CliError;
use crate::util::{display_path, require_non_empty};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMethod {
    Name,
    Id,
}

pub fn command() -> Command {
    Command::new("find")
        .about("Find the source file of a test by its display name or [test_id:N] token")
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
        .arg(
            Arg::new("by-id")
                .long("by-id")
                .action(ArgAction::SetTrue)
                .help("Search for the [test_id:N] token of NAME instead of a dry-run"),
        )
        .arg(
            Arg::new("search")
                .long("search")
                .value_name("BACKEND")
                .value_parser(["rg", "walk"])
                .default_value("rg")
                .help("Text search used with --by-id"),
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
    let backend = SearchBackend::parse(
        matches
            .get_one::<String>("search")
            .map(String::as_str)
            .unwrap_or("rg"),
    )?;

    let searcher = session.searcher(backend);
    let (file, method) = lookup(
        &session.catalogs,
        searcher.as_ref(),
        &name,
        Path::new(dir),
        matches.get_flag("by-id"),
        &session.config.matching,
    )?;

    Ok(CommandResult::TestFile {
        name,
        file: display_path(&file),
        method,
    })
}

/// By id when asked; otherwise by name, retrying by id when a name carrying a
/// `[test_id:N]` token finds no unique entry.
fn lookup<C, S>(
    catalogs: &C,
    searcher: &S,
    name: &str,
    dir: &Path,
    by_id: bool,
    options: &MatchOptions,
) -> Result<(PathBuf, LookupMethod), ScopeError>
where
    C: CatalogSource + ?Sized,
    S: TextSearcher + ?Sized,
{
    if by_id {
        return Ok((resolve_by_id(searcher, name, dir)?, LookupMethod::Id));
    }
    match find_test_file_by_name(catalogs, name, dir, options) {
        Ok(file) => Ok((file, LookupMethod::Name)),
        Err(ScopeError::NotFound(_)) if has_test_id(name) => {
            tracing::debug!(name = %name, "no unique name match, searching by test id");
            Ok((resolve_by_id(searcher, name, dir)?, LookupMethod::Id))
        }
        Err(err) => Err(err),
    }
}
