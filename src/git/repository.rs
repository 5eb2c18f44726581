use git2::Repository;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::ExtractionResult;

pub struct GitRepository {
    pub repo: Repository,
    pub path: String,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::open(&path)
            .map_err(|_| AppError::not_found("repository", path_str.clone()))?;

        Ok(Self {
            repo,
            path: path_str,
        })
    }

    /// Full extraction: branches, commits reachable from any branch, the HEAD
    /// file snapshot, contributors and per-commit modifications.
    pub fn extract(&self) -> Result<ExtractionResult> {
        let branches = self.branches()?;
        let walk = self.walk_history(&branches)?;
        let files = self.head_files()?;

        Ok(ExtractionResult {
            commits: walk.commits,
            files,
            branches: branches.into_iter().map(|(branch, _)| branch).collect(),
            contributors: walk.contributors,
            modifications: walk.modifications,
        })
    }
}
