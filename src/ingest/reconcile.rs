//! Deleted-file reconciliation.
//!
//! History references paths that may be gone from the current snapshot. Each
//! such path gets exactly one placeholder file, shared by every modification
//! that touched it.

use std::collections::{BTreeSet, HashSet};

use crate::models::ExtractedModification;

/// A file record synthesized for a path absent from the live listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub path: &'a str,
    pub name: &'a str,
}

impl<'a> Placeholder<'a> {
    pub fn for_path(path: &'a str) -> Self {
        let name = path.rsplit_once('/').map_or(path, |(_, name)| name);
        Self { path, name }
    }
}

/// Modifications split by whether their path exists in the snapshot.
#[derive(Debug)]
pub struct Partition<'a> {
    pub resolvable: Vec<&'a ExtractedModification>,
    pub orphaned: Vec<&'a ExtractedModification>,
}

pub fn partition<'a>(
    modifications: &'a [ExtractedModification],
    live_paths: &HashSet<&str>,
) -> Partition<'a> {
    let (resolvable, orphaned): (Vec<_>, Vec<_>) = modifications
        .iter()
        .partition(|m| live_paths.contains(m.file.as_str()));
    Partition {
        resolvable,
        orphaned,
    }
}

/// The minimal set of placeholders covering every orphaned modification,
/// one per distinct path, in path order.
pub fn placeholders<'a>(orphaned: &[&'a ExtractedModification]) -> Vec<Placeholder<'a>> {
    orphaned
        .iter()
        .map(|m| m.file.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(Placeholder::for_path)
        .collect()
}
