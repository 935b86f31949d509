//! CrewDesk Client Core
//!
//! Layered architecture:
//! - domain: Team-scoped records and their rules
//! - backend: Document store, auth and blob storage services
//! - repository: Typed, team-scoped access to the document store
//! - mirror: Live in-memory copies of the team's collections
//! - session: Signed-in user and the mirrors that follow them
//! - commands: Write operations invoked by the views
//! - import: Spreadsheet CSV import
//! - entitlement: Subscription purchase and restore

use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod backend;
pub mod repository;
pub mod mirror;
pub mod session;
pub mod commands;
pub mod import;
pub mod entitlement;
pub mod config;

use backend::{DocumentStore, FsBlobStore, LocalAuth, MemoryStore, SqliteStore};
use config::{AppConfig, BackendConfig};
use entitlement::StaticStorefront;
pub use session::{Route, Services, Session};

const APP_NAME: &str = "crewdesk";

/// Build the local service set described by `config`
pub fn build_services(config: AppConfig, data_dir: &Path) -> Result<Services, String> {
    let store: Arc<dyn DocumentStore> = match &config.backend {
        BackendConfig::Memory => Arc::new(MemoryStore::new()),
        BackendConfig::Sqlite { .. } => {
            let path = config
                .database_path(data_dir)
                .ok_or_else(|| "No database path configured".to_string())?;
            log::info!("Opening document store at {}", path.display());
            Arc::new(SqliteStore::open(&path).map_err(|e| e.to_string())?)
        }
    };

    Ok(Services {
        store,
        auth: Arc::new(LocalAuth::new()),
        blobs: Arc::new(FsBlobStore::new(config.blob_dir(data_dir), &config.blob_base_url)),
        storefront: Arc::new(StaticStorefront::with_catalog(&config.products)),
        config,
    })
}

/// Load the configuration from `data_dir`, start logging and return a
/// signed-out session
pub fn bootstrap(data_dir: &Path) -> Result<Session, String> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| format!("Failed to create {}: {}", data_dir.display(), e))?;
    let config = config::load_or_default(data_dir);

    if let Err(e) = rolling_logger::init_logger(config.log_dir(data_dir), APP_NAME) {
        eprintln!("Logging disabled: {}", e);
    }
    let _ = rolling_logger::info(&format!("Starting with data dir {}", data_dir.display()));

    let services = build_services(config, data_dir)?;
    Ok(Session::new(services))
}

/// Most recent log lines, for the diagnostics view
pub fn recent_log_lines() -> Vec<String> {
    rolling_logger::recent_lines()
}
