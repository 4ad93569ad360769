use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{CliError, ExitStatus};

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub json: bool,
    pub verbose: bool,
}

/// Opens `path` for writing, or a kept temp file named `<prefix>*.json` when no path is given.
pub fn create_output(path: Option<&str>, prefix: &str) -> Result<(File, PathBuf), CliError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|err| {
                CliError::new(format!("cannot create {path}: {err}"), ExitStatus::Io)
            })?;
            Ok((file, PathBuf::from(path)))
        }
        None => tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".json")
            .tempfile()?
            .keep()
            .map_err(|err| CliError::from(err.error)),
    }
}

/// Writes `value` as one line of JSON and returns where it went.
pub fn write_json<T: Serialize + ?Sized>(
    path: Option<&str>,
    prefix: &str,
    value: &T,
) -> Result<PathBuf, CliError> {
    let (file, path) = create_output(path, prefix)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(path)
}

pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn require_non_empty(value: &str, field: &str) -> Result<(), CliError> {
    if value.trim().is_empty() {
        return Err(CliError::new(
            format!("{field} must not be empty"),
            ExitStatus::Usage,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_json_to_explicit_path() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("names.json");
        let written = write_json(target.to_str(), "unused-", &vec!["a b", "c"]).unwrap();
        assert_eq!(written, target);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "[\"a b\",\"c\"]\n");
    }

    #[test]
    fn keeps_temp_file_when_no_path_given() {
        let written = write_json(None, "changed-tests-", &Vec::<String>::new()).unwrap();
        let name = written.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("changed-tests-") && name.ends_with(".json"), "{name}");
        assert_eq!(std::fs::read_to_string(&written).unwrap(), "[]\n");
        std::fs::remove_file(written).unwrap();
    }

    #[test]
    fn rejects_blank_values() {
        assert!(require_non_empty("  ", "--dir").is_err());
        assert!(require_non_empty("tests", "--dir").is_ok());
    }
}
