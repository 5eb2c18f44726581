use git2::{Delta, FileMode, Repository};

use crate::error::Result;
use crate::models::{ChangeKind, ExtractedModification};

/// Files touched by `commit` relative to its first parent (the empty tree for
/// root commits). Deletions report the old path, everything else the new one.
/// Paths are built from the raw tree bytes exactly as `head_files` builds
/// them, and submodule entries are skipped the same way.
pub fn commit_modifications(
    repo: &Repository,
    commit: &git2::Commit,
    hash: &str,
) -> Result<Vec<ExtractedModification>> {
    let tree = commit.tree()?;

    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

    let mut modifications = Vec::new();

    for delta in diff.deltas() {
        let Some(kind) = change_kind(delta.status()) else {
            continue;
        };

        let side = if kind == ChangeKind::Delete {
            delta.old_file()
        } else {
            delta.new_file()
        };
        if side.mode() == FileMode::Commit {
            continue;
        }
        let Some(file) = side.path_bytes() else {
            continue;
        };

        modifications.push(ExtractedModification {
            kind,
            file: String::from_utf8_lossy(file).to_string(),
            commit: hash.to_string(),
        });
    }

    Ok(modifications)
}

fn change_kind(status: Delta) -> Option<ChangeKind> {
    match status {
        Delta::Added => Some(ChangeKind::Add),
        Delta::Deleted => Some(ChangeKind::Delete),
        Delta::Modified => Some(ChangeKind::Modify),
        Delta::Renamed => Some(ChangeKind::Rename),
        Delta::Copied => Some(ChangeKind::Copy),
        Delta::Typechange => Some(ChangeKind::TypeChange),
        _ => None,
    }
}
