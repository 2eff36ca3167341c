//! # Storage Module
//!
//! Durable persistence consumed by the account manager: the SQLite record
//! store (account row + settings) and the optional auth lock file.

pub mod auth_lock;
pub mod database;
pub mod schema;

pub use database::{AccountRecord, AccountStore, Database};
