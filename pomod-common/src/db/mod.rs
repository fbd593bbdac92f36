//! Database access layer
//!
//! SQLite-backed persistence for settings and sessions.

pub mod init;
pub mod settings;

pub use init::init_database;
