//! The ordered write cascade for one extraction result.
//!
//! Steps, each depending only on earlier ones:
//! 1. repository  2. repository languages  3. contributors  4. branches
//! 5. commits + commit/branch links  6. files  7. modifications
//! 8. placeholder files for deleted paths + their modifications
//!
//! The caller owns the transaction; any error returned here leaves it
//! uncommitted.

use std::collections::{HashMap, HashSet};

use crate::error::{AppError, Result};
use crate::ingest::reconcile;
use crate::language::{LanguageRegistry, file_extension};
use crate::models::{
    BranchId, CommitId, ContributorId, ExtractedBranch, ExtractedModification, ExtractionResult,
    FileId, LanguageId, RepoData, RepositoryId, UserId,
};
use crate::store::IngestTx;

/// Rows written by one cascade run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeCounts {
    pub languages: usize,
    pub contributors: usize,
    pub branches: usize,
    pub commits: usize,
    pub commit_branches: usize,
    pub files: usize,
    pub placeholder_files: usize,
    pub modifications: usize,
}

pub struct Cascade<'a, 'conn> {
    tx: &'a IngestTx<'conn>,
    registry: &'a dyn LanguageRegistry,
    extraction: &'a ExtractionResult,
    counts: CascadeCounts,
}

impl<'a, 'conn> Cascade<'a, 'conn> {
    pub fn new(
        tx: &'a IngestTx<'conn>,
        registry: &'a dyn LanguageRegistry,
        extraction: &'a ExtractionResult,
    ) -> Self {
        Self {
            tx,
            registry,
            extraction,
            counts: CascadeCounts::default(),
        }
    }

    pub fn run(
        mut self,
        owner: UserId,
        repo: &RepoData,
        languages: &[LanguageId],
    ) -> Result<CascadeCounts> {
        let repo_id = self.tx.create_repository(owner, &repo.name, &repo.description)?;
        tracing::debug!("Created repository {} (id {})", repo.name, repo_id.0);

        for language in languages {
            self.tx.add_repository_language(repo_id, *language)?;
        }
        self.counts.languages = languages.len();

        let contributors = self.create_contributors(repo_id)?;
        let branches = self.create_branches(repo_id)?;
        let commits = self.create_commits(repo_id, &contributors, &branches)?;
        let mut files = self.create_files(repo_id)?;
        self.create_modifications(repo_id, &commits, &mut files)?;

        Ok(self.counts)
    }

    fn create_contributors(
        &mut self,
        repo: RepositoryId,
    ) -> Result<HashMap<&'a str, ContributorId>> {
        let extraction = self.extraction;
        let mut contributors = HashMap::new();
        for name in &extraction.contributors {
            if contributors.contains_key(name.as_str()) {
                continue;
            }
            let id = self.tx.create_contributor(repo, name)?;
            contributors.insert(name.as_str(), id);
        }
        self.counts.contributors = contributors.len();
        tracing::debug!("Created {} contributors", contributors.len());
        Ok(contributors)
    }

    fn create_branches(
        &mut self,
        repo: RepositoryId,
    ) -> Result<Vec<(&'a ExtractedBranch, BranchId)>> {
        let extraction = self.extraction;
        let mut branches = Vec::with_capacity(extraction.branches.len());
        for branch in &extraction.branches {
            let id = self.tx.create_branch(repo, &branch.name, branch.kind)?;
            branches.push((branch, id));
        }
        self.counts.branches = branches.len();
        tracing::debug!("Created {} branches", branches.len());
        Ok(branches)
    }

    fn create_commits(
        &mut self,
        repo: RepositoryId,
        contributors: &HashMap<&str, ContributorId>,
        branches: &[(&ExtractedBranch, BranchId)],
    ) -> Result<HashMap<&'a str, CommitId>> {
        let extraction = self.extraction;
        let mut commits = HashMap::with_capacity(extraction.commits.len());

        for commit in &extraction.commits {
            let author = contributors.get(commit.author.as_str()).copied().ok_or_else(|| {
                AppError::not_found(
                    "contributor",
                    format!(
                        "author '{}' of commit {} is not among the extracted contributors",
                        commit.author, commit.hash
                    ),
                )
            })?;

            let id = self.tx.create_commit(repo, author, commit)?;

            for (branch, branch_id) in branches {
                if commit.branches.iter().any(|name| *name == branch.name) {
                    self.tx.link_commit_branch(id, *branch_id)?;
                    self.counts.commit_branches += 1;
                }
            }

            commits.insert(commit.hash.as_str(), id);
        }

        self.counts.commits = commits.len();
        tracing::debug!(
            "Created {} commits with {} branch links",
            commits.len(),
            self.counts.commit_branches
        );
        Ok(commits)
    }

    fn create_files(&mut self, repo: RepositoryId) -> Result<HashMap<&'a str, FileId>> {
        let extraction = self.extraction;
        let mut files = HashMap::with_capacity(extraction.files.len());

        for file in &extraction.files {
            if files.contains_key(file.path.as_str()) {
                return Err(AppError::Unexpected(format!(
                    "Duplicate file path in extraction: {}",
                    file.path
                )));
            }
            let language =
                file_extension(&file.name).and_then(|ext| self.registry.by_extension(ext));
            let id = self
                .tx
                .create_file(repo, &file.name, Some(file.size), &file.path, language)?;
            files.insert(file.path.as_str(), id);
        }

        self.counts.files = files.len();
        tracing::debug!("Created {} files", files.len());
        Ok(files)
    }

    /// Steps 7 and 8. Modifications whose path is absent from the snapshot
    /// are written after their placeholder file exists.
    fn create_modifications(
        &mut self,
        repo: RepositoryId,
        commits: &HashMap<&str, CommitId>,
        files: &mut HashMap<&'a str, FileId>,
    ) -> Result<()> {
        let live_paths: HashSet<&str> = files.keys().copied().collect();
        let extraction = self.extraction;
        let split = reconcile::partition(&extraction.modifications, &live_paths);

        for modification in &split.resolvable {
            self.create_modification(modification, commits, files)?;
        }

        let placeholders = reconcile::placeholders(&split.orphaned);
        for placeholder in &placeholders {
            let id = self
                .tx
                .create_file(repo, placeholder.name, None, placeholder.path, None)?;
            files.insert(placeholder.path, id);
        }
        self.counts.placeholder_files = placeholders.len();

        for modification in &split.orphaned {
            self.create_modification(modification, commits, files)?;
        }

        tracing::debug!(
            "Created {} modifications ({} against {} placeholder files)",
            self.counts.modifications,
            split.orphaned.len(),
            placeholders.len()
        );
        Ok(())
    }

    fn create_modification(
        &mut self,
        modification: &ExtractedModification,
        commits: &HashMap<&str, CommitId>,
        files: &HashMap<&str, FileId>,
    ) -> Result<()> {
        let commit = commits.get(modification.commit.as_str()).copied().ok_or_else(|| {
            AppError::not_found(
                "commit",
                format!(
                    "modification of {} references unknown commit {}",
                    modification.file, modification.commit
                ),
            )
        })?;
        let file = files.get(modification.file.as_str()).copied().ok_or_else(|| {
            AppError::not_found("file", format!("no file record for {}", modification.file))
        })?;

        self.tx.create_modification(commit, file, modification.kind)?;
        self.counts.modifications += 1;
        Ok(())
    }
}
