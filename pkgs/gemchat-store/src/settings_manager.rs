//! Key/value storage backing the chatroom registry

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set,
};
use sea_orm_migration::MigratorTrait;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::entities::settings;

/// Whole-value storage under string keys
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Open (creating if needed) the SQLite database and run migrations
pub async fn open_database(db_path: &Path) -> Result<DatabaseConnection> {
    let db_path_str = db_path
        .to_str()
        .context("Invalid database path")?
        .replace("\\", "/");

    let db_url = format!("sqlite:{}?mode=rwc", db_path_str);

    let db = Database::connect(db_url.as_str())
        .await
        .context("Failed to connect to database")?;

    crate::migration::Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    info!("Database initialized at {}", db_path.display());
    Ok(db)
}

/// Settings manager for storing and retrieving application settings
#[derive(Clone)]
pub struct SettingsManager {
    db: DatabaseConnection,
}

impl SettingsManager {
    /// Create a new settings manager
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open the database at `db_path` and wrap it
    pub async fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(open_database(db_path).await?))
    }

    /// Get a setting value by key
    pub async fn get(&self, key: &str) -> Result<Option<String>, DbErr> {
        debug!("Getting setting: {}", key);

        let result = settings::Entity::find()
            .filter(settings::Column::Key.eq(key))
            .one(&self.db)
            .await?;

        Ok(result.map(|model| model.value))
    }

    /// Set a setting value
    pub async fn set(&self, key: &str, value: &str) -> Result<(), DbErr> {
        debug!("Setting key: {}", key);

        let now = chrono::Utc::now().timestamp_millis();

        let existing = settings::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await?;

        if let Some(model) = existing {
            let mut active_model: settings::ActiveModel = model.into();
            active_model.value = Set(value.to_string());
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_setting = settings::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(now),
            };
            // Handle RecordNotFound from insert return value
            match new_setting.insert(&self.db).await {
                Ok(_) => {}
                Err(DbErr::RecordNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Delete a setting by key
    pub async fn delete(&self, key: &str) -> Result<bool, DbErr> {
        debug!("Deleting setting: {}", key);

        let result = settings::Entity::delete_by_id(key.to_string())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Check if a setting exists
    pub async fn exists(&self, key: &str) -> Result<bool, DbErr> {
        Ok(self.get(key).await?.is_some())
    }

    /// Get all settings
    pub async fn get_all(&self) -> Result<Vec<(String, String)>, DbErr> {
        let settings = settings::Entity::find().all(&self.db).await?;

        Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
    }
}

#[async_trait]
impl KeyValueStore for SettingsManager {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.get(key)
            .await
            .with_context(|| format!("Failed to read setting '{}'", key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value)
            .await
            .with_context(|| format!("Failed to write setting '{}'", key))
    }
}

/// In-process store for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value).await
    }
}
