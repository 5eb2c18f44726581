//! Repository ingestion: validation, extraction and the transactional
//! write cascade behind `createRepository`.
//!
//! - `cascade`: ordered entity creation inside one `IngestTx`
//! - `reconcile`: placeholder files for paths deleted before the snapshot

pub mod cascade;
pub mod reconcile;

use std::sync::Arc;
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::git::MetadataSource;
use crate::language::LanguageRegistry;
use crate::models::{LanguageId, RepoData, RepositorySummary, User};
use crate::store::{SharedStore, SqliteStore};
use crate::validation::ValidationGate;

pub use cascade::{Cascade, CascadeCounts};

/// Service object behind `createRepository`. Cheap to clone; every
/// dependency is shared.
#[derive(Clone)]
pub struct IngestionEngine {
    store: SharedStore,
    source: Arc<dyn MetadataSource>,
    languages: Arc<dyn LanguageRegistry>,
}

impl IngestionEngine {
    pub fn new(
        store: SharedStore,
        source: Arc<dyn MetadataSource>,
        languages: Arc<dyn LanguageRegistry>,
    ) -> Self {
        Self {
            store,
            source,
            languages,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Validates, extracts and persists one repository. Git extraction and
    /// SQLite writes are blocking, so the whole request runs on the blocking
    /// pool.
    pub async fn create_repository(&self, repo_data: RepoData, actor_token: String) -> Result<()> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            engine.create_repository_blocking(&repo_data, &actor_token)
        })
        .await?
    }

    pub fn create_repository_blocking(
        &self,
        repo_data: &RepoData,
        actor_token: &str,
    ) -> Result<()> {
        let start = Instant::now();

        let (actor, language_ids) = {
            let store = self.lock_store()?;
            self.preflight(&store, repo_data, actor_token)?
        };

        let extraction = self.source.extract(&repo_data.name)?;

        let mut store = self.lock_store()?;
        let tx = store.begin_ingest()?;
        let counts = match Cascade::new(&tx, self.languages.as_ref(), &extraction).run(
            actor.id,
            repo_data,
            &language_ids,
        ) {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(
                    "Rolling back ingestion of {} for {}: {}",
                    repo_data.name,
                    actor.username,
                    e
                );
                return Err(e);
            }
        };
        tx.commit()?;

        tracing::info!(
            "Ingested {}/{}: {} commits, {} branches, {} contributors, {} files ({} placeholders), {} modifications in {:?}",
            actor.username,
            repo_data.name,
            counts.commits,
            counts.branches,
            counts.contributors,
            counts.files + counts.placeholder_files,
            counts.placeholder_files,
            counts.modifications,
            start.elapsed()
        );
        Ok(())
    }

    /// Entity counts for `owner/name`. Waits behind any ingestion holding the
    /// store, so it also runs on the blocking pool.
    pub async fn repository_summary(
        &self,
        owner: String,
        name: String,
    ) -> Result<RepositorySummary> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.repository_summary_blocking(&owner, &name))
            .await?
    }

    pub fn repository_summary_blocking(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<RepositorySummary> {
        let store = self.lock_store()?;
        let repo = store
            .find_repository_by_username(owner, name)?
            .ok_or_else(|| AppError::not_found("repository", format!("{}/{}", owner, name)))?;
        store.repository_summary(&repo)
    }

    /// Everything that must hold before the first write: input validation,
    /// upstream existence, ownership conflict and declared languages.
    fn preflight(
        &self,
        store: &SqliteStore,
        repo_data: &RepoData,
        actor_token: &str,
    ) -> Result<(User, Vec<LanguageId>)> {
        let actor = ValidationGate::check(repo_data, actor_token, store)?;

        if !self.source.exists(&repo_data.name)? {
            return Err(AppError::not_found(
                "repository",
                format!("'{}' does not exist upstream", repo_data.name),
            ));
        }

        // The UNIQUE(owner_id, name) constraint still arbitrates concurrent
        // attempts that both pass this check.
        if store.find_repository(actor.id, &repo_data.name)?.is_some() {
            return Err(AppError::Conflict(format!(
                "Repository '{}' already exists for this user",
                repo_data.name
            )));
        }

        let language_ids = repo_data
            .languages
            .iter()
            .map(|name| {
                self.languages
                    .by_name(name)
                    .ok_or_else(|| AppError::not_found("language", name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((actor, language_ids))
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, SqliteStore>> {
        self.store
            .lock()
            .map_err(|_| AppError::Unexpected("Lock poisoned".to_string()))
    }
}
