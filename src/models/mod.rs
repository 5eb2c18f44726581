//! Data transfer objects.
//!
//! - `extraction`: ExtractionResult and its commit/file/branch/modification rows
//! - `records`: persisted records with typed ids, RepositorySummary
//! - `request`: RepoData accepted by `createRepository`

pub mod extraction;
pub mod records;
pub mod request;

pub use extraction::*;
pub use records::*;
pub use request::*;
