//! # Record Store
//!
//! SQLite-backed persistence for the account row and arbitrary settings.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RECORD STORE                                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  AccountManager ──► AccountStore (trait) ──► Database ──► rusqlite      │
//! │                                                                         │
//! │  account:  exactly one row at a time; put replaces wholesale            │
//! │  settings: arbitrary key/value strings for the application shell        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The account manager depends only on [`AccountStore`], so hosts that
//! already own a persistence layer can supply their own implementation.

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;

use super::schema;
use crate::error::{Error, Result};

/// The persisted account row.
///
/// `encrypted_seed` is base64 of `nonce ‖ ciphertext`; `salt` and
/// `public_key` are hex. None of the fields are secret on their own; the
/// seed blob is protected by the password-derived key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Identity public key, hex-encoded
    pub public_key: String,
    /// Account display name
    pub name: String,
    /// Avatar reference URI
    pub avatar: String,
    /// base64(nonce ‖ AES-GCM ciphertext of the recovery phrase)
    pub encrypted_seed: String,
    /// KDF salt for this blob, hex-encoded
    pub salt: String,
    /// Creation time, epoch seconds
    pub created_at: i64,
}

/// Durable storage consumed by the account manager.
///
/// Exactly one account row exists at a time; `put_account` replaces any
/// prior row in a single statement.
pub trait AccountStore: Send + Sync {
    /// Insert or wholesale-replace the account row
    fn put_account(&self, record: &AccountRecord) -> Result<()>;
    /// Fetch the account row, if one exists
    fn get_account(&self) -> Result<Option<AccountRecord>>;
    /// Delete the account row; no error if absent
    fn delete_account(&self) -> Result<()>;

    /// Insert or replace a settings entry
    fn put_setting(&self, key: &str, value: &str) -> Result<()>;
    /// Fetch a settings entry
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    /// Delete a settings entry; no error if absent
    fn delete_setting(&self, key: &str) -> Result<()>;
}

/// SQLite-backed [`AccountStore`]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database.
    ///
    /// If `path` is `None`, creates an in-memory database (useful for
    /// testing).
    pub fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::Database(format!("Failed to open database: {}", e)))?,
            None => Connection::open_in_memory()
                .map_err(|e| Error::Database(format!("Failed to create in-memory database: {}", e)))?,
        };

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .ok();

        match version {
            None => {
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::Database(format!("Failed to create tables: {}", e)))?;

                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| Error::Database(format!("Failed to set schema version: {}", e)))?;

                tracing::info!("Record store schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) => {
                tracing::debug!("Record store schema version: {}", v);
            }
        }

        Ok(())
    }
}

impl AccountStore for Database {
    fn put_account(&self, record: &AccountRecord) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT OR REPLACE INTO account (id, public_key, name, avatar, encrypted_seed, salt, created_at)
             VALUES (1, ?, ?, ?, ?, ?, ?)",
            params![
                record.public_key,
                record.name,
                record.avatar,
                record.encrypted_seed,
                record.salt,
                record.created_at,
            ],
        )
        .map_err(|e| Error::Database(format!("Failed to store account: {}", e)))?;

        Ok(())
    }

    fn get_account(&self) -> Result<Option<AccountRecord>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            "SELECT public_key, name, avatar, encrypted_seed, salt, created_at
             FROM account WHERE id = 1",
            [],
            |row| {
                Ok(AccountRecord {
                    public_key: row.get(0)?,
                    name: row.get(1)?,
                    avatar: row.get(2)?,
                    encrypted_seed: row.get(3)?,
                    salt: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::Database(format!("Failed to load account: {}", e))),
        }
    }

    fn delete_account(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute("DELETE FROM account WHERE id = 1", [])
            .map_err(|e| Error::Database(format!("Failed to delete account: {}", e)))?;

        Ok(())
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )
        .map_err(|e| Error::Database(format!("Failed to store setting: {}", e)))?;

        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            "SELECT value FROM settings WHERE key = ?",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::Database(format!("Failed to load setting: {}", e))),
        }
    }

    fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute("DELETE FROM settings WHERE key = ?", params![key])
            .map_err(|e| Error::Database(format!("Failed to delete setting: {}", e)))?;

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
