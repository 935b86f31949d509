//! Application Configuration
//!
//! JSON settings stored next to the local database in the app data
//! directory. Every field has a default, so a missing or partial file
//! still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::SubscriptionTier;

pub const CONFIG_FILE: &str = "crewdesk_config.json";

/// Which document store backs the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Process-local, lost on exit
    Memory,
    /// SQLite file, relative paths resolve against the data directory
    Sqlite { path: PathBuf },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Sqlite {
            path: PathBuf::from("crewdesk.db"),
        }
    }
}

/// Store product identifiers for the two paid tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductCatalog {
    pub basic: String,
    pub premium: String,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self {
            basic: "com.crewdesk.subscription.basic".to_string(),
            premium: "com.crewdesk.subscription.premium".to_string(),
        }
    }
}

impl ProductCatalog {
    pub fn tier_for(&self, product_id: &str) -> Option<SubscriptionTier> {
        if product_id == self.basic {
            Some(SubscriptionTier::Basic)
        } else if product_id == self.premium {
            Some(SubscriptionTier::Premium)
        } else {
            None
        }
    }

    pub fn product_for(&self, tier: SubscriptionTier) -> Option<&str> {
        match tier {
            SubscriptionTier::Basic => Some(&self.basic),
            SubscriptionTier::Premium => Some(&self.premium),
            SubscriptionTier::Free => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Directory for uploaded attachments and gear images
    pub blob_root: PathBuf,
    /// Public prefix of download URLs
    pub blob_base_url: String,
    /// CSV export URL with an `{id}` placeholder for the sheet id
    pub sheet_export_template: String,
    pub products: ProductCatalog,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            blob_root: PathBuf::from("blobs"),
            blob_base_url: "http://localhost:9199/v0/b/crewdesk/o".to_string(),
            sheet_export_template: crate::import::DEFAULT_EXPORT_TEMPLATE.to_string(),
            products: ProductCatalog::default(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

fn resolve(data_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}

impl AppConfig {
    pub fn database_path(&self, data_dir: &Path) -> Option<PathBuf> {
        match &self.backend {
            BackendConfig::Sqlite { path } => Some(resolve(data_dir, path)),
            BackendConfig::Memory => None,
        }
    }

    pub fn blob_dir(&self, data_dir: &Path) -> PathBuf {
        resolve(data_dir, &self.blob_root)
    }

    pub fn log_dir(&self, data_dir: &Path) -> PathBuf {
        resolve(data_dir, &self.log_dir)
    }
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Read the configuration file, `None` when missing or unreadable
pub fn get_config(data_dir: &Path) -> Option<AppConfig> {
    let path = config_path(data_dir);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
            None
        }
    }
}

pub fn load_or_default(data_dir: &Path) -> AppConfig {
    get_config(data_dir).unwrap_or_default()
}

pub fn save_config(data_dir: &Path, config: &AppConfig) -> Result<(), String> {
    std::fs::create_dir_all(data_dir).map_err(|e| format!("Failed to create {}: {}", data_dir.display(), e))?;
    let json = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
    std::fs::write(config_path(data_dir), json).map_err(|e| format!("Failed to write config: {}", e))
}
