use rusqlite::{Transaction, params};

use super::{is_unique_violation, now_ms};
use crate::error::{AppError, Result};
use crate::models::{
    BranchId, BranchKind, ChangeKind, CommitId, ContributorId, ExtractedCommit, FileId,
    LanguageId, ModificationId, RepositoryId, UserId,
};

/// Scoped write transaction for one ingestion.
///
/// Every create method writes through the same SQLite transaction. Nothing is
/// visible to other readers until `commit`; dropping the value rolls back.
pub struct IngestTx<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> IngestTx<'conn> {
    pub(super) fn new(tx: Transaction<'conn>) -> Self {
        Self { tx }
    }

    pub fn create_repository(
        &self,
        owner: UserId,
        name: &str,
        description: &str,
    ) -> Result<RepositoryId> {
        self.tx
            .execute(
                "INSERT INTO repositories (owner_id, name, description, created_at_ms)
                 VALUES (?1, ?2, ?3, ?4)",
                params![owner.0, name, description, now_ms()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!(
                        "Repository '{}' already exists for this user",
                        name
                    ))
                } else {
                    e.into()
                }
            })?;
        Ok(RepositoryId(self.tx.last_insert_rowid()))
    }

    pub fn add_repository_language(&self, repo: RepositoryId, language: LanguageId) -> Result<()> {
        self.tx
            .prepare_cached(
                "INSERT INTO repository_languages (repository_id, language_id) VALUES (?1, ?2)",
            )?
            .execute(params![repo.0, language.0])?;
        Ok(())
    }

    pub fn create_contributor(&self, repo: RepositoryId, name: &str) -> Result<ContributorId> {
        self.tx
            .prepare_cached("INSERT INTO contributors (repository_id, name) VALUES (?1, ?2)")?
            .execute(params![repo.0, name])
            .map_err(|e| unique_as_unexpected(e, "contributor", name))?;
        Ok(ContributorId(self.tx.last_insert_rowid()))
    }

    pub fn create_branch(
        &self,
        repo: RepositoryId,
        name: &str,
        kind: BranchKind,
    ) -> Result<BranchId> {
        self.tx
            .prepare_cached("INSERT INTO branches (repository_id, name, kind) VALUES (?1, ?2, ?3)")?
            .execute(params![repo.0, name, kind.as_str()])
            .map_err(|e| unique_as_unexpected(e, "branch", name))?;
        Ok(BranchId(self.tx.last_insert_rowid()))
    }

    pub fn create_commit(
        &self,
        repo: RepositoryId,
        author: ContributorId,
        commit: &ExtractedCommit,
    ) -> Result<CommitId> {
        self.tx
            .prepare_cached(
                "INSERT INTO commits (repository_id, contributor_id, title, content, hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?
            .execute(params![
                repo.0,
                author.0,
                commit.title,
                commit.content,
                commit.hash,
                commit.created_at.timestamp(),
            ])
            .map_err(|e| unique_as_unexpected(e, "commit hash", &commit.hash))?;
        Ok(CommitId(self.tx.last_insert_rowid()))
    }

    pub fn link_commit_branch(&self, commit: CommitId, branch: BranchId) -> Result<()> {
        self.tx
            .prepare_cached("INSERT INTO commit_branches (commit_id, branch_id) VALUES (?1, ?2)")?
            .execute(params![commit.0, branch.0])?;
        Ok(())
    }

    /// `size == None` stores a placeholder file.
    pub fn create_file(
        &self,
        repo: RepositoryId,
        name: &str,
        size: Option<u64>,
        path: &str,
        language: Option<LanguageId>,
    ) -> Result<FileId> {
        let size = size
            .map(i64::try_from)
            .transpose()
            .map_err(|_| AppError::Unexpected(format!("File size out of range: {}", path)))?;
        self.tx
            .prepare_cached(
                "INSERT INTO files (repository_id, name, size, path, language_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![repo.0, name, size, path, language.map(|l| l.0)])
            .map_err(|e| unique_as_unexpected(e, "file path", path))?;
        Ok(FileId(self.tx.last_insert_rowid()))
    }

    pub fn create_modification(
        &self,
        commit: CommitId,
        file: FileId,
        kind: ChangeKind,
    ) -> Result<ModificationId> {
        self.tx
            .prepare_cached(
                "INSERT INTO modifications (commit_id, file_id, kind) VALUES (?1, ?2, ?3)",
            )?
            .execute(params![commit.0, file.0, kind.as_str()])?;
        Ok(ModificationId(self.tx.last_insert_rowid()))
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

/// Duplicates below the repository level mean the extraction itself is
/// inconsistent.
fn unique_as_unexpected(err: rusqlite::Error, what: &str, value: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::Unexpected(format!("Duplicate {} in extraction: {}", what, value))
    } else {
        err.into()
    }
}
