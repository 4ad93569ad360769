use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// Commit hashes are compared on this many leading characters unless configured otherwise.
pub const DEFAULT_HASH_PREFIX_LEN: usize = 11;
/// Text the outline extractor reports for nodes whose description is not a literal.
pub const DEFAULT_PLACEHOLDER_TEXT: &str = "undefined";
/// Prefix ginkgo adds to the text of `When` containers.
pub const DEFAULT_NARRATIVE_PREFIX: &str = "when ";
pub const DEFAULT_SOURCE_SUFFIX: &str = ".go";

/// Tunables for matching, filtering and reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchOptions {
    /// Length commit hashes are truncated to before prefix matching; `None` keeps full hashes.
    pub hash_prefix_len: Option<usize>,
    pub placeholder_text: String,
    pub narrative_prefix: String,
    /// Only changed files with this suffix are mapped onto outlines.
    pub source_suffix: String,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            hash_prefix_len: Some(DEFAULT_HASH_PREFIX_LEN),
            placeholder_text: DEFAULT_PLACEHOLDER_TEXT.to_string(),
            narrative_prefix: DEFAULT_NARRATIVE_PREFIX.to_string(),
            source_suffix: DEFAULT_SOURCE_SUFFIX.to_string(),
        }
    }
}

/// Executables used by the process-backed collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub git: String,
    pub ginkgo: String,
    pub ripgrep: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            git: "git".into(),
            ginkgo: "ginkgo".into(),
            ripgrep: "rg".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeConfig {
    pub matching: MatchOptions,
    pub tools: ToolConfig,
}

impl ScopeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScopeError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        Self::from_yaml(&raw).map_err(|err| err.context(path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ScopeError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ScopeConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ScopeError> {
        if self.matching.hash_prefix_len == Some(0) {
            return Err(ScopeError::Config(
                "matching.hash_prefix_len must be greater than zero".into(),
            ));
        }
        for (field, value) in [
            ("tools.git", &self.tools.git),
            ("tools.ginkgo", &self.tools.ginkgo),
            ("tools.ripgrep", &self.tools.ripgrep),
        ] {
            if value.trim().is_empty() {
                return Err(ScopeError::Config(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}
