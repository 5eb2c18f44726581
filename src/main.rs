//! repohub - repository history import service
//!
//! # Usage
//! ```bash
//! repohub serve --db repohub.db --repos-root /srv/git   # Start server
//! repohub add-user --db repohub.db alice s3cret-token   # Register an actor
//! repohub add-language --db repohub.db Rust rs          # Register a language
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::{Args, Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repohub::git::GitMetadataSource;
use repohub::language::LanguageTable;
use repohub::store::SqliteStore;
use repohub::{IngestionEngine, routes};

/// repohub - import git repositories into a browsable relational store
#[derive(Parser)]
#[command(name = "repohub")]
#[command(about = "Repository history import service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DbArgs {
    /// Path to the SQLite database
    #[arg(long, env = "REPOHUB_DB", default_value = "repohub.db")]
    db: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[command(flatten)]
        db: DbArgs,

        /// Directory holding upstream repositories as <root>/<name>
        #[arg(long, env = "REPOHUB_REPOS_ROOT")]
        repos_root: PathBuf,

        /// Address to bind
        #[arg(long, env = "REPOHUB_BIND", default_value = "127.0.0.1")]
        bind: String,

        /// Port to run the server on
        #[arg(short, long, env = "REPOHUB_PORT", default_value = "3001")]
        port: u16,
    },
    /// Register a user and the access token that identifies them
    AddUser {
        #[command(flatten)]
        db: DbArgs,
        username: String,
        token: String,
    },
    /// Register a language and its file extension
    AddLanguage {
        #[command(flatten)]
        db: DbArgs,
        name: String,
        extension: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::AddUser {
            db,
            username,
            token,
        } => {
            let mut store = SqliteStore::open(&db.db)?;
            let id = store.create_user(&username, &token)?;
            println!("✓ Registered user {} (id {})", username, id.0);
            Ok(())
        }
        Commands::AddLanguage {
            db,
            name,
            extension,
        } => {
            let mut store = SqliteStore::open(&db.db)?;
            let id = store.create_language(&name, &extension)?;
            println!("✓ Registered language {} (id {})", name, id.0);
            Ok(())
        }
        Commands::Serve {
            db,
            repos_root,
            bind,
            port,
        } => serve(db.db, repos_root, bind, port).await,
    }
}

async fn serve(db: PathBuf, repos_root: PathBuf, bind: String, port: u16) -> anyhow::Result<()> {
    if !repos_root.is_dir() {
        anyhow::bail!("Repository root is not a directory: {}", repos_root.display());
    }

    let store = SqliteStore::open(&db)?;
    let languages = LanguageTable::load(&store)?;
    tracing::info!(
        "Opened store {} with {} languages",
        db.display(),
        languages.len()
    );

    let engine = IngestionEngine::new(
        store.into_shared(),
        Arc::new(GitMetadataSource::new(&repos_root)),
        Arc::new(languages),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(engine))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        "Serving http://{} (repositories under {})",
        addr,
        repos_root.display()
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
