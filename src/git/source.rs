use std::path::PathBuf;

use crate::error::Result;
use crate::git::repository::GitRepository;
use crate::models::ExtractionResult;

/// Produces the extraction result for one upstream repository.
pub trait MetadataSource: Send + Sync {
    fn exists(&self, name: &str) -> Result<bool>;

    fn extract(&self, name: &str) -> Result<ExtractionResult>;
}

/// Upstream repositories live at `<root>/<name>`.
#[derive(Debug, Clone)]
pub struct GitMetadataSource {
    root: PathBuf,
}

impl GitMetadataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl MetadataSource for GitMetadataSource {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(git2::Repository::open(self.path_for(name)).is_ok())
    }

    fn extract(&self, name: &str) -> Result<ExtractionResult> {
        let repo = GitRepository::open(self.path_for(name))?;
        let start = std::time::Instant::now();
        let result = repo.extract()?;
        tracing::debug!(
            "Extracted {}: {} commits, {} files, {} modifications in {:?}",
            name,
            result.commits.len(),
            result.files.len(),
            result.modifications.len(),
            start.elapsed()
        );
        Ok(result)
    }
}
