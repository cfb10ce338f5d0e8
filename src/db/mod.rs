//! Database module - SQLite storage for user profiles

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::StoreError;
use crate::profile::{ProfilePatch, UserProfile};

/// Persistent store of user profiles
pub trait ProfileStore {
    fn get(&self, name: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Insert a new profile, failing if the name is taken
    fn create(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Merge the patch into the stored profile atomically
    fn update(&self, name: &str, patch: &ProfilePatch) -> Result<(), StoreError>;
}

/// Database wrapper
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private database, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let db = Self { conn: Mutex::new(conn) };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        self.lock()?.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                name TEXT PRIMARY KEY,
                profile TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn read_profile(conn: &Connection, name: &str) -> Result<Option<UserProfile>, StoreError> {
    let json: Option<String> = conn
        .query_row(
            "SELECT profile FROM profiles WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    match json {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

impl ProfileStore for Database {
    fn get(&self, name: &str) -> Result<Option<UserProfile>, StoreError> {
        let conn = self.lock()?;
        read_profile(&conn, name)
    }

    fn create(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let json = serde_json::to_string(profile)?;
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO profiles (name, profile) VALUES (?1, ?2)",
            params![profile.name, json],
        )?;
        if inserted == 0 {
            return Err(StoreError::Conflict(profile.name.clone()));
        }
        debug!("Created profile {}", profile.name);
        Ok(())
    }

    fn update(&self, name: &str, patch: &ProfilePatch) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut profile =
            read_profile(&tx, name)?.ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        patch.apply(&mut profile);

        tx.execute(
            "UPDATE profiles SET profile = ?2 WHERE name = ?1",
            params![name, serde_json::to_string(&profile)?],
        )?;
        tx.commit()?;
        Ok(())
    }
}
