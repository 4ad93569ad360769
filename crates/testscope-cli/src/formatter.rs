use std::process::ExitCode;

use serde_json::json;

use crate::commands::CommandResult;
use crate::commands::find::LookupMethod;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a `CommandResult` as text or a single JSON line and derives the exit code from it.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::ChangedTests {
            revision_range,
            test_names,
            path_count,
            names_path,
            paths_path,
            debug_files,
        } => {
            println!(
                "Changed tests in {revision_range}: {} ({path_count} outline paths)",
                test_names.len()
            );
            for name in test_names {
                println!("  - {name}");
            }
            println!("Test names written to {names_path}");
            println!("Test paths written to {paths_path}");
            for file in debug_files {
                println!("Debug input written to {file}");
            }
        }
        CommandResult::TestFile { file, method, .. } => match method {
            LookupMethod::Name => println!("{file}"),
            LookupMethod::Id => println!("{file} (by test id)"),
        },
        CommandResult::Quarantined {
            name,
            file,
            changed,
        } => {
            if *changed {
                println!("Quarantined '{name}' in {file}");
            } else {
                println!("'{name}' not rewritten: leaf text not found in {file}");
            }
        }
        CommandResult::Schema { schema, .. } => println!("{schema:#}"),
    }
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let payload = json!(result);
    println!("{payload}");
    Ok(())
}
