//! Persisted record types as read back from the store.
//!
//! Identifiers are SQLite rowids wrapped in newtypes so a `FileId` can never be
//! passed where a `CommitId` is expected.

use serde::{Deserialize, Serialize};

use super::{BranchKind, ChangeKind};

macro_rules! record_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub i64);
        )*
    };
}

record_id!(
    UserId,
    LanguageId,
    RepositoryId,
    ContributorId,
    BranchId,
    CommitId,
    FileId,
    ModificationId,
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: RepositoryId,
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub id: ContributorId,
    pub name: String,
    pub repository_id: RepositoryId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRecord {
    pub id: BranchId,
    pub name: String,
    pub kind: BranchKind,
    pub repository_id: RepositoryId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: CommitId,
    pub title: String,
    pub content: String,
    pub hash: String,
    pub contributor_id: ContributorId,
    pub created_at: i64,
    pub repository_id: RepositoryId,
}

/// `size` is `None` for placeholder files reconstructed from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    pub size: Option<u64>,
    pub path: String,
    pub repository_id: RepositoryId,
    pub language_id: Option<LanguageId>,
}

impl FileRecord {
    pub fn is_placeholder(&self) -> bool {
        self.size.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationRecord {
    pub id: ModificationId,
    pub kind: ChangeKind,
    pub commit_id: CommitId,
    pub file_id: FileId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: String,
    pub languages: Vec<String>,
    pub contributors: usize,
    pub branches: usize,
    pub commits: usize,
    pub files: usize,
    pub placeholder_files: usize,
    pub modifications: usize,
}
