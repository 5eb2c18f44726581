//! Extraction result DTOs produced by a `MetadataSource`.
//!
//! - `ExtractionResult`: everything extracted for one repository
//! - `ExtractedCommit`: one commit with its declared branch membership
//! - `ExtractedFile`: one blob in the current snapshot
//! - `ExtractedBranch`: branch name plus `BranchKind`
//! - `ExtractedModification`: one (commit, path, change) triple
//!
//! Used by: `IngestionEngine` as the sole input to the write cascade

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub commits: Vec<ExtractedCommit>,
    pub files: Vec<ExtractedFile>,
    pub branches: Vec<ExtractedBranch>,
    pub contributors: Vec<String>,
    pub modifications: Vec<ExtractedModification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedCommit {
    pub title: String,
    pub content: String,
    pub hash: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFile {
    pub name: String,
    pub size: u64,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedBranch {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BranchKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedModification {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Path of the touched file.
    pub file: String,
    /// Hash of the owning commit.
    pub commit: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Modify,
    Delete,
    Rename,
    Copy,
    TypeChange,
}

impl BranchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Local => "local",
            BranchKind::Remote => "remote",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(BranchKind::Local),
            "remote" => Some(BranchKind::Remote),
            _ => None,
        }
    }
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Modify => "modify",
            ChangeKind::Delete => "delete",
            ChangeKind::Rename => "rename",
            ChangeKind::Copy => "copy",
            ChangeKind::TypeChange => "typechange",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(ChangeKind::Add),
            "modify" => Some(ChangeKind::Modify),
            "delete" => Some(ChangeKind::Delete),
            "rename" => Some(ChangeKind::Rename),
            "copy" => Some(ChangeKind::Copy),
            "typechange" => Some(ChangeKind::TypeChange),
            _ => None,
        }
    }
}
