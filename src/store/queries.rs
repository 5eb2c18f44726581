//! Read side of the store: lookups used by the validation gate, the summary
//! route and the tests that check referential consistency after ingestion.

use rusqlite::{OptionalExtension, Row, params};

use super::SqliteStore;
use crate::error::{AppError, Result};
use crate::models::{
    BranchId, BranchKind, BranchRecord, ChangeKind, CommitId, CommitRecord, ContributorId,
    ContributorRecord, FileId, FileRecord, LanguageId, ModificationId, ModificationRecord,
    RepositoryId, RepositoryRecord, RepositorySummary, UserId,
};

impl SqliteStore {
    pub fn find_repository(&self, owner: UserId, name: &str) -> Result<Option<RepositoryRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, description, owner_id FROM repositories
                 WHERE owner_id = ?1 AND name = ?2",
                params![owner.0, name],
                repository_from_row,
            )
            .optional()?)
    }

    pub fn find_repository_by_username(
        &self,
        username: &str,
        name: &str,
    ) -> Result<Option<RepositoryRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT r.id, r.name, r.description, r.owner_id FROM repositories r
                 JOIN users u ON u.id = r.owner_id
                 WHERE u.username = ?1 AND r.name = ?2",
                params![username, name],
                repository_from_row,
            )
            .optional()?)
    }

    pub fn count_repositories(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM repositories", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    pub fn repository_languages(&self, repo: RepositoryId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.name FROM repository_languages rl
             JOIN languages l ON l.id = rl.language_id
             WHERE rl.repository_id = ?1 ORDER BY l.name",
        )?;
        let rows = stmt.query_map(params![repo.0], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    pub fn contributors(&self, repo: RepositoryId) -> Result<Vec<ContributorRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, repository_id FROM contributors WHERE repository_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![repo.0], |row| {
            Ok(ContributorRecord {
                id: ContributorId(row.get(0)?),
                name: row.get(1)?,
                repository_id: RepositoryId(row.get(2)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn branches(&self, repo: RepositoryId) -> Result<Vec<BranchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind, repository_id FROM branches WHERE repository_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![repo.0], |row| {
            Ok((
                BranchId(row.get(0)?),
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                RepositoryId(row.get(3)?),
            ))
        })?;

        let mut branches = Vec::new();
        for row in rows {
            let (id, name, kind, repository_id) = row?;
            let kind = BranchKind::parse(&kind)
                .ok_or_else(|| AppError::Unexpected(format!("Unknown branch kind: {}", kind)))?;
            branches.push(BranchRecord {
                id,
                name,
                kind,
                repository_id,
            });
        }
        Ok(branches)
    }

    pub fn commits(&self, repo: RepositoryId) -> Result<Vec<CommitRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, hash, contributor_id, created_at, repository_id
             FROM commits WHERE repository_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![repo.0], |row| {
            Ok(CommitRecord {
                id: CommitId(row.get(0)?),
                title: row.get(1)?,
                content: row.get(2)?,
                hash: row.get(3)?,
                contributor_id: ContributorId(row.get(4)?),
                created_at: row.get(5)?,
                repository_id: RepositoryId(row.get(6)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Branch names a commit was linked to, sorted.
    pub fn commit_branch_names(&self, commit: CommitId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.name FROM commit_branches cb
             JOIN branches b ON b.id = cb.branch_id
             WHERE cb.commit_id = ?1 ORDER BY b.name, b.kind",
        )?;
        let rows = stmt.query_map(params![commit.0], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    pub fn files(&self, repo: RepositoryId) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, size, path, repository_id, language_id
             FROM files WHERE repository_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![repo.0], |row| {
            Ok(FileRecord {
                id: FileId(row.get(0)?),
                name: row.get(1)?,
                size: row.get::<_, Option<i64>>(2)?.map(|s| s as u64),
                path: row.get(3)?,
                repository_id: RepositoryId(row.get(4)?),
                language_id: row.get::<_, Option<i64>>(5)?.map(LanguageId),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every modification whose commit belongs to `repo`.
    pub fn modifications(&self, repo: RepositoryId) -> Result<Vec<ModificationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.id, m.kind, m.commit_id, m.file_id FROM modifications m
             JOIN commits c ON c.id = m.commit_id
             WHERE c.repository_id = ?1 ORDER BY m.id",
        )?;
        let rows = stmt.query_map(params![repo.0], |row| {
            Ok((
                ModificationId(row.get(0)?),
                row.get::<_, String>(1)?,
                CommitId(row.get(2)?),
                FileId(row.get(3)?),
            ))
        })?;

        let mut modifications = Vec::new();
        for row in rows {
            let (id, kind, commit_id, file_id) = row?;
            let kind = ChangeKind::parse(&kind)
                .ok_or_else(|| AppError::Unexpected(format!("Unknown change kind: {}", kind)))?;
            modifications.push(ModificationRecord {
                id,
                kind,
                commit_id,
                file_id,
            });
        }
        Ok(modifications)
    }

    pub fn repository_summary(&self, repo: &RepositoryRecord) -> Result<RepositorySummary> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, params![repo.id.0], |r| r.get(0))?;
            Ok(n as usize)
        };

        Ok(RepositorySummary {
            name: repo.name.clone(),
            description: repo.description.clone(),
            languages: self.repository_languages(repo.id)?,
            contributors: count("SELECT COUNT(*) FROM contributors WHERE repository_id = ?1")?,
            branches: count("SELECT COUNT(*) FROM branches WHERE repository_id = ?1")?,
            commits: count("SELECT COUNT(*) FROM commits WHERE repository_id = ?1")?,
            files: count("SELECT COUNT(*) FROM files WHERE repository_id = ?1")?,
            placeholder_files: count(
                "SELECT COUNT(*) FROM files WHERE repository_id = ?1 AND size IS NULL",
            )?,
            modifications: count(
                "SELECT COUNT(*) FROM modifications m JOIN commits c ON c.id = m.commit_id
                 WHERE c.repository_id = ?1",
            )?,
        })
    }
}

fn repository_from_row(row: &Row<'_>) -> rusqlite::Result<RepositoryRecord> {
    Ok(RepositoryRecord {
        id: RepositoryId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        owner_id: UserId(row.get(3)?),
    })
}
