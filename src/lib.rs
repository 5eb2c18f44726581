//! repohub - imports git repository history into a relational store.
//!
//! The core is `IngestionEngine::create_repository`: validate the request,
//! extract commits/branches/files/contributors/modifications from the
//! upstream repository and write them as one atomic, cross-referenced
//! cascade, reconstructing files that were deleted before the snapshot.

pub mod error;
pub mod git;
pub mod ingest;
pub mod language;
pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

pub use error::{AppError, Result};
pub use ingest::IngestionEngine;
