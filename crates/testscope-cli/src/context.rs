use std::path::PathBuf;
use std::sync::Arc;

use testscope::{
    CachedCatalog, ChangeDetector, GinkgoDryRun, GinkgoOutline, GitCli, RipgrepSearcher,
    ScopeConfig, TextSearcher, WalkSearcher,
};

use crate::error::{CliError, ExitStatus};
use crate::util::Verbosity;

pub type Catalogs = Arc<CachedCatalog<GinkgoDryRun>>;
pub type Detector = ChangeDetector<Arc<GitCli>, Arc<GitCli>, GinkgoOutline, Catalogs>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchBackend {
    Ripgrep,
    Walk,
}

impl SearchBackend {
    pub fn parse(value: &str) -> Result<Self, CliError> {
        match value {
            "rg" => Ok(SearchBackend::Ripgrep),
            "walk" => Ok(SearchBackend::Walk),
            other => Err(CliError::new(
                format!("unknown search backend '{other}', expected rg or walk"),
                ExitStatus::Usage,
            )),
        }
    }
}

pub struct CliSession {
    pub config: ScopeConfig,
    pub config_path: Option<PathBuf>,
    pub git: Arc<GitCli>,
    pub catalogs: Catalogs, // shared by every command that needs a dry-run
    pub verbosity: Verbosity,
}

impl CliSession {
    pub fn bootstrap(config_path: Option<String>, verbosity: Verbosity) -> Result<Self, CliError> {
        let config_path = config_path.map(PathBuf::from);
        let config = match &config_path {
            Some(path) => ScopeConfig::load(path)?,
            None => ScopeConfig::default(),
        };

        let git = Arc::new(GitCli::new(config.tools.git.clone()));
        let catalogs = Arc::new(CachedCatalog::new(GinkgoDryRun::new(
            config.tools.ginkgo.clone(),
        )));

        Ok(Self {
            config,
            config_path,
            git,
            catalogs,
            verbosity,
        })
    }

    pub fn detector(&self) -> Detector {
        ChangeDetector::new(
            self.git.clone(),
            self.git.clone(),
            GinkgoOutline::new(self.config.tools.ginkgo.clone()),
            self.catalogs.clone(),
        )
        .with_options(self.config.matching.clone())
    }

    pub fn searcher(&self, backend: SearchBackend) -> Box<dyn TextSearcher> {
        match backend {
            SearchBackend::Ripgrep => {
                Box::new(RipgrepSearcher::new(self.config.tools.ripgrep.clone()))
            }
            SearchBackend::Walk => Box::new(WalkSearcher),
        }
    }
}
