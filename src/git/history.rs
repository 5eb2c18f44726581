use git2::{BranchType, Oid, Sort};
use std::collections::{HashMap, HashSet};

use crate::error::{AppError, Result};
use crate::git::diff::commit_modifications;
use crate::git::repository::GitRepository;
use crate::models::{BranchKind, ExtractedBranch, ExtractedCommit, ExtractedModification};

/// Output of one history walk over every branch tip.
#[derive(Debug, Default)]
pub struct HistoryWalk {
    /// Newest first.
    pub commits: Vec<ExtractedCommit>,
    /// Distinct author names in first-seen order.
    pub contributors: Vec<String>,
    pub modifications: Vec<ExtractedModification>,
}

impl GitRepository {
    /// Local and remote branches with their tip commits. Symbolic refs such as
    /// `origin/HEAD` have no direct target and are skipped.
    pub fn branches(&self) -> Result<Vec<(ExtractedBranch, Oid)>> {
        let mut branches = Vec::new();

        for branch_result in self.repo.branches(None)? {
            let (branch, branch_type) = branch_result?;
            let Some(tip) = branch.get().target() else {
                continue;
            };
            let Some(name) = branch.name()? else {
                continue;
            };

            let kind = match branch_type {
                BranchType::Local => BranchKind::Local,
                BranchType::Remote => BranchKind::Remote,
            };

            branches.push((
                ExtractedBranch {
                    name: name.to_string(),
                    kind,
                },
                tip,
            ));
        }

        Ok(branches)
    }

    /// Walks every commit reachable from any branch tip. Each commit declares
    /// the names of the branches whose history contains it.
    pub fn walk_history(&self, branches: &[(ExtractedBranch, Oid)]) -> Result<HistoryWalk> {
        if branches.is_empty() {
            return Ok(HistoryWalk::default());
        }

        let membership = self.branch_membership(branches)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        for (_, tip) in branches {
            revwalk.push(*tip)?;
        }

        let mut walk = HistoryWalk::default();
        let mut seen_authors: HashSet<String> = HashSet::new();

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            let author = commit.author().name().unwrap_or("Unknown").to_string();
            if seen_authors.insert(author.clone()) {
                walk.contributors.push(author.clone());
            }

            let (title, content) = split_message(commit.message().unwrap_or(""));
            let seconds = commit.author().when().seconds();
            let created_at = chrono::DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                AppError::Unexpected(format!("Commit {} has an invalid timestamp", oid))
            })?;

            let hash = oid.to_string();
            walk.modifications
                .extend(commit_modifications(&self.repo, &commit, &hash)?);

            walk.commits.push(ExtractedCommit {
                title,
                content,
                hash,
                author,
                created_at,
                branches: membership.get(&oid).cloned().unwrap_or_default(),
            });
        }

        Ok(walk)
    }

    /// Commit → names of branches that contain it.
    fn branch_membership(
        &self,
        branches: &[(ExtractedBranch, Oid)],
    ) -> Result<HashMap<Oid, Vec<String>>> {
        let mut membership: HashMap<Oid, Vec<String>> = HashMap::new();

        for (branch, tip) in branches {
            let mut revwalk = self.repo.revwalk()?;
            revwalk.push(*tip)?;

            for oid in revwalk {
                let names = membership.entry(oid?).or_default();
                if !names.contains(&branch.name) {
                    names.push(branch.name.clone());
                }
            }
        }

        Ok(membership)
    }
}

/// First line becomes the title, the remainder (trimmed) the content.
fn split_message(message: &str) -> (String, String) {
    let message = message.trim();
    match message.split_once('\n') {
        Some((title, rest)) => (title.trim().to_string(), rest.trim().to_string()),
        None => (message.to_string(), String::new()),
    }
}
