//! SurrealDB connection configuration and setup
//!
//! Supports in-memory, local on-disk (SurrealKV), plain URL, and
//! authenticated remote (WebSocket) connections.

use std::path::PathBuf;

use crate::error::StateError;
use crate::migrations;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{info, instrument};

/// Default namespace for RL-Vis tables
pub const DEFAULT_NAMESPACE: &str = "rlvis";
/// Default database name
pub const DEFAULT_DATABASE: &str = "main";
/// Local persistence directory used when nothing else is configured
pub const DEFAULT_LOCAL_PATH: &str = ".rlvis/db";

/// Credentials for an authenticated remote SurrealDB instance
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

/// Where the store lives
#[derive(Debug, Clone)]
pub enum StoreTarget {
    /// Volatile `mem://` database
    Memory,
    /// SurrealKV directory on local disk
    Local(PathBuf),
    /// Any URL understood by `surrealdb::engine::any`, without sign-in
    Url(String),
    /// Authenticated remote endpoint
    Remote(RemoteConfig),
}

/// Store connection configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub target: StoreTarget,
    pub namespace: String,
    pub database: String,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self::with_target(StoreTarget::Memory)
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::with_target(StoreTarget::Local(path.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::with_target(StoreTarget::Url(url.into()))
    }

    fn with_target(target: StoreTarget) -> Self {
        Self {
            target,
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Create from environment variables
    ///
    /// Resolution order:
    /// 1. `SURREALDB_ENDPOINT` + `SURREALDB_USERNAME` + `SURREALDB_PASSWORD`
    ///    (optional `SURREALDB_ROOT=true` for root users) → remote
    /// 2. `SURREALDB_URL` → plain URL
    /// 3. otherwise local persistence under `.rlvis/db`
    ///
    /// `SURREALDB_NAMESPACE` and `SURREALDB_DATABASE` override the defaults
    /// ("rlvis" / "main") in every case.
    pub fn from_env() -> std::result::Result<Self, StateError> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let target = match var("SURREALDB_ENDPOINT") {
            Some(endpoint) => {
                let username = var("SURREALDB_USERNAME")
                    .ok_or_else(|| StateError::Config("SURREALDB_USERNAME not set".into()))?;
                let password = var("SURREALDB_PASSWORD")
                    .ok_or_else(|| StateError::Config("SURREALDB_PASSWORD not set".into()))?;
                let is_root = var("SURREALDB_ROOT")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false);
                StoreTarget::Remote(RemoteConfig {
                    endpoint,
                    username,
                    password,
                    is_root,
                })
            }
            None => match var("SURREALDB_URL") {
                Some(url) => StoreTarget::Url(url),
                None => StoreTarget::Local(PathBuf::from(DEFAULT_LOCAL_PATH)),
            },
        };

        let mut config = Self::with_target(target);
        if let Some(ns) = var("SURREALDB_NAMESPACE") {
            config.namespace = ns;
        }
        if let Some(db) = var("SURREALDB_DATABASE") {
            config.database = db;
        }
        Ok(config)
    }
}

/// Open a connection for `config`, select namespace/database, and run migrations.
#[instrument(skip_all, fields(namespace = %config.namespace, database = %config.database))]
pub async fn connect(config: &StoreConfig) -> Result<Surreal<Any>> {
    let db = match &config.target {
        StoreTarget::Memory => {
            info!("Connecting to SurrealDB (in-memory)");
            open("mem://").await?
        }
        StoreTarget::Local(path) => {
            std::fs::create_dir_all(path).map_err(|e| {
                StateError::Connection(format!(
                    "Failed to create database directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let url = format!("surrealkv://{}", path.display());
            info!("Using local persistence: {}", url);
            open(&url).await?
        }
        StoreTarget::Url(url) => {
            info!("Connecting to {}", url);
            open(url).await?
        }
        StoreTarget::Remote(remote) => {
            info!(
                "Connecting to remote SurrealDB (root={})",
                remote.is_root
            );
            let db = open(&remote.endpoint).await?;
            if remote.is_root {
                db.signin(Root {
                    username: &remote.username,
                    password: &remote.password,
                })
                .await
                .map_err(|e| StateError::Connection(format!("Root auth failed: {e}")))?;
            } else {
                db.signin(Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username: &remote.username,
                    password: &remote.password,
                })
                .await
                .map_err(|e| StateError::Connection(format!("DB auth failed: {e}")))?;
            }
            db
        }
    };

    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .map_err(|e| {
            StateError::Connection(format!("Failed to select namespace/database: {}", e))
        })?;

    migrations::init_schema(&db)
        .await
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;

    Ok(db)
}

async fn open(url: &str) -> Result<Surreal<Any>> {
    surrealdb::engine::any::connect(url)
        .await
        .map_err(|e| StateError::Connection(format!("Failed to connect to {}: {}", url, e)))
}
