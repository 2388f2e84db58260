//! SurrealDB schema migrations and initialization
//!
//! This module provides initialization functions to set up all tables
//! with their constraints and indexes.

use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all RL-Vis tables in SurrealDB
///
/// Called on every connection. Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing RL-Vis SurrealDB schema");

    init_owners_table(db).await?;
    init_runs_table(db).await?;

    info!("RL-Vis schema initialization complete");
    Ok(())
}

/// Initialize `owners` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE owners {
///   owner_id:       STRING (unique)
///   email:          STRING (unique)
///   password_hash:  STRING (sha256 hex)
///   created_at:     DATETIME
/// }
/// ```
async fn init_owners_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing owners table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS owners SCHEMALESS;

        -- Email is the login identity, one owner per address
        DEFINE INDEX IF NOT EXISTS idx_owner_email ON TABLE owners COLUMNS email UNIQUE;

        DEFINE INDEX IF NOT EXISTS idx_owner_id ON TABLE owners COLUMNS owner_id UNIQUE;
    "#;

    db.query(sql).await?.check()?;
    info!("✓ owners table initialized");
    Ok(())
}

/// Initialize `runs` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE runs {
///   run_id:      STRING (unique)
///   owner_id:    STRING (indexed)
///   run_name:    STRING (not unique; duplicate names are separate runs)
///   data_json:   STRING (opaque serialized record set)
///   created_at:  DATETIME (indexed)
/// }
/// ```
///
/// Runs are never updated in place. Editing is delete-and-recreate.
async fn init_runs_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing runs table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS runs SCHEMALESS;

        DEFINE INDEX IF NOT EXISTS idx_run_id ON TABLE runs COLUMNS run_id UNIQUE;

        -- Owner listings, newest first
        DEFINE INDEX IF NOT EXISTS idx_owner_created_at ON TABLE runs COLUMNS owner_id, created_at;
    "#;

    db.query(sql).await?.check()?;
    info!("✓ runs table initialized");
    Ok(())
}
