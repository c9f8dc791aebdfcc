//! SQLite-backed datasource store.
//!
//! Committed join configurations are kept per datasource name in
//! `~/.multitable/datasources.db`, together with the connection context
//! they were built against and a small property map.
//!
//! # Design
//!
//! - One row per datasource, JSON columns for the configuration and
//!   properties
//! - Versioned: a version mismatch clears the store
//! - A configuration is only handed back for the context it was saved for
//!
//! # Origin
//!
//! [`DatasourceStore::origin`] classifies a datasource as created by this
//! wizard or by something else. A record that exists but cannot be read is
//! reported as [`DatasourceOrigin::Unreadable`], never folded into one of
//! the other answers.

mod hash;
pub use hash::connection_context;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::persist::PersistedJoinConfig;
use crate::session::{CommitResult, CommitSnapshot, ModelCommitSink};

/// Current store schema version. Bump this when the row format changes.
const STORE_VERSION: i32 = 1;

/// Property marking a datasource created by this wizard.
pub const WIZARD_GENERATED_SCHEMA: &str = "WIZARD_GENERATED_SCHEMA";

/// Older spelling of [`WIZARD_GENERATED_SCHEMA`], still honoured.
pub const AGILE_BI_GENERATED_SCHEMA: &str = "AGILE_BI_GENERATED_SCHEMA";

/// Property recording the modeling mode of a committed datasource.
pub const MODELING_MODE: &str = "MODELING_MODE";

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to determine store directory")]
    NoStoreDir,

    #[error("store connection lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A stored datasource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceRecord {
    pub name: String,
    pub context: String,
    pub config: PersistedJoinConfig,
    pub properties: BTreeMap<String, String>,
    /// Seconds since the Unix epoch.
    pub updated_at: i64,
}

impl DatasourceRecord {
    pub fn new(
        name: impl Into<String>,
        context: impl Into<String>,
        config: PersistedJoinConfig,
    ) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            config,
            properties: BTreeMap::new(),
            updated_at: now(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_wizard_generated(&self) -> bool {
        self.properties.contains_key(WIZARD_GENERATED_SCHEMA)
            || self.properties.contains_key(AGILE_BI_GENERATED_SCHEMA)
    }
}

/// Who created a datasource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "origin", content = "reason")]
pub enum DatasourceOrigin {
    /// Exists and was not generated by the wizard.
    Metadata,
    /// Exists and carries a wizard-generated marker.
    WizardGenerated,
    /// No datasource with that name.
    Absent,
    /// Exists but could not be read.
    Unreadable(String),
}

impl std::fmt::Display for DatasourceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasourceOrigin::Metadata => write!(f, "metadata"),
            DatasourceOrigin::WizardGenerated => write!(f, "wizard-generated"),
            DatasourceOrigin::Absent => write!(f, "absent"),
            DatasourceOrigin::Unreadable(reason) => write!(f, "unreadable: {}", reason),
        }
    }
}

/// SQLite-based datasource store.
pub struct DatasourceStore {
    conn: Mutex<Connection>,
}

impl DatasourceStore {
    /// Open or create the store at `path`.
    ///
    /// If the store version doesn't match, it's automatically cleared.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.init()?;
        debug!(path = %path.display(), "datasource store opened");
        Ok(store)
    }

    /// Open the store at its default location.
    pub fn open_default() -> StoreResult<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init()?;
        Ok(store)
    }

    /// `~/.multitable/datasources.db`
    pub fn default_path() -> StoreResult<PathBuf> {
        let base = dirs::home_dir().ok_or(StoreError::NoStoreDir)?;
        Ok(base.join(".multitable").join("datasources.db"))
    }

    fn init(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS datasources (
                name TEXT PRIMARY KEY,
                context TEXT NOT NULL,
                config TEXT NOT NULL,
                properties TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == STORE_VERSION => {}
            Some(v) => {
                warn!(found = v, expected = STORE_VERSION, "store version mismatch, clearing");
                conn.execute("DELETE FROM datasources", [])?;
                set_version(&conn)?;
            }
            None => set_version(&conn)?,
        }

        Ok(())
    }

    /// Insert or replace a datasource.
    pub fn save(&self, record: &DatasourceRecord) -> StoreResult<()> {
        let config = serde_json::to_string(&record.config)?;
        let properties = serde_json::to_string(&record.properties)?;
        self.lock()?.execute(
            "INSERT OR REPLACE INTO datasources (name, context, config, properties, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            params![record.name, record.context, config, properties, record.updated_at],
        )?;
        debug!(datasource = %record.name, "datasource saved");
        Ok(())
    }

    /// Load a datasource by name.
    pub fn load(&self, name: &str) -> StoreResult<Option<DatasourceRecord>> {
        let row: Option<(String, String, String, i64)> = self
            .lock()?
            .query_row(
                "SELECT context, config, properties, updated_at FROM datasources WHERE name = ?",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        match row {
            Some((context, config, properties, updated_at)) => Ok(Some(DatasourceRecord {
                name: name.to_string(),
                context,
                config: serde_json::from_str(&config)?,
                properties: serde_json::from_str(&properties)?,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    /// Load the saved configuration of `name` if it was built for `context`.
    pub fn load_config(&self, name: &str, context: &str) -> StoreResult<Option<PersistedJoinConfig>> {
        match self.load(name)? {
            Some(record) if record.context == context => Ok(Some(record.config)),
            Some(record) => {
                debug!(
                    datasource = %name,
                    saved_context = %record.context,
                    "saved configuration belongs to another connection"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Delete a datasource. Returns true if it existed.
    pub fn delete(&self, name: &str) -> StoreResult<bool> {
        let rows = self
            .lock()?
            .execute("DELETE FROM datasources WHERE name = ?", params![name])?;
        Ok(rows > 0)
    }

    /// All datasource names, sorted.
    pub fn names(&self) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM datasources ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Classify who created the datasource `name`.
    pub fn origin(&self, name: &str) -> DatasourceOrigin {
        match self.load(name) {
            Ok(Some(record)) if record.is_wizard_generated() => DatasourceOrigin::WizardGenerated,
            Ok(Some(_)) => DatasourceOrigin::Metadata,
            Ok(None) => DatasourceOrigin::Absent,
            Err(err) => {
                warn!(datasource = %name, error = %err, "failed to read datasource");
                DatasourceOrigin::Unreadable(err.to_string())
            }
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl ModelCommitSink for DatasourceStore {
    fn commit(&self, snapshot: &CommitSnapshot) -> CommitResult<()> {
        let record = DatasourceRecord::new(&snapshot.name, &snapshot.context, snapshot.to_config())
            .with_property(WIZARD_GENERATED_SCHEMA, "true")
            .with_property(MODELING_MODE, snapshot.mode.as_str());
        self.save(&record)?;
        Ok(())
    }
}

fn set_version(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
        params![STORE_VERSION.to_string()],
    )?;
    Ok(())
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
