use serde::Serialize;

use crate::error::ExitStatus;

pub mod changed;
pub mod find;
pub mod quarantine;
pub mod schema;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    ChangedTests {
        revision_range: String,
        test_names: Vec<String>,
        path_count: usize,
        names_path: String,
        paths_path: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        debug_files: Vec<String>,
    },
    TestFile {
        name: String,
        file: String,
        method: find::LookupMethod,
    },
    Quarantined {
        name: String,
        file: String,
        changed: bool,
    },
    Schema {
        output: String,
        schema: serde_json::Value,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::Quarantined { changed, .. } => {
                if *changed {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            _ => ExitStatus::Ok,
        }
    }
}
