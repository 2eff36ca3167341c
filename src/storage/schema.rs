//! # Database Schema
//!
//! SQL schema for the record store. The account table is constrained to a
//! single row: creating a new account replaces the previous one wholesale.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initial schema
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS account (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    public_key TEXT NOT NULL,
    name TEXT NOT NULL,
    avatar TEXT NOT NULL,
    encrypted_seed TEXT NOT NULL,
    salt TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
