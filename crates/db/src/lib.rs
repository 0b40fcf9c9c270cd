//! torwache-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern bereit: das Benutzerverzeichnis
//! ([`UserRepository`]) und den persistenten Auth-Zustand ([`AuthRepository`])
//! mit Token-Sperrliste und Login-Versuchen. [`SqliteDb`] implementiert beide.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{AuthRepository, DatabaseConfig, DbResult, UserRepository};
pub use sqlite::SqliteDb;
