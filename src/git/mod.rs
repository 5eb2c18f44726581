//! Git-backed metadata extraction.
//!
//! - `source`: the `MetadataSource` seam and the directory-rooted `GitMetadataSource`
//! - `repository`: `GitRepository` handle and full-extraction entry point
//! - `history`: branches, commits with declared branch membership, contributors
//! - `tree`: current file snapshot from HEAD
//! - `diff`: per-commit modifications against the first parent

pub mod diff;
pub mod history;
pub mod repository;
pub mod source;
pub mod tree;

pub use repository::GitRepository;
pub use source::{GitMetadataSource, MetadataSource};
