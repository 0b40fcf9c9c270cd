//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Der Auth-Kern kennt nur diese Traits; die
//! SQLite-Implementierung liegt in [`crate::sqlite`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{
    BenutzerFilter, BenutzerRecord, BenutzerUpdate, LoginVersuchRecord, NeueSperre,
    NeuerBenutzer,
};

/// Result-Alias fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://torwache.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://torwache.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Benutzerverzeichnis
///
/// Alle Lesezugriffe ignorieren weich geloeschte Benutzer.
#[allow(async_fn_in_trait)]
pub trait UserRepository: Send + Sync {
    /// Legt einen Benutzer an; eine bereits vergebene E-Mail ergibt `DbError::Eindeutigkeit`
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<BenutzerRecord>>;

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>>;

    /// Aendert die gesetzten Felder und aktualisiert `updated_at`
    async fn update(&self, id: Uuid, data: BenutzerUpdate) -> DbResult<BenutzerRecord>;

    /// Setzt `deleted_at`; gibt `false` zurueck wenn kein aktiver Benutzer betroffen war
    async fn soft_delete(&self, id: Uuid) -> DbResult<bool>;

    /// Entfernt den Datensatz endgueltig
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    /// Paginierte Liste (neueste zuerst) plus Gesamtanzahl der Treffer
    async fn list(&self, filter: BenutzerFilter<'_>) -> DbResult<(Vec<BenutzerRecord>, u64)>;
}

/// Persistenter Auth-Zustand: Token-Sperrliste und Login-Versuche
#[allow(async_fn_in_trait)]
pub trait AuthRepository: Send + Sync {
    /// Traegt ein Token in die Sperrliste ein (append-only)
    async fn revoke_token(&self, data: NeueSperre<'_>) -> DbResult<()>;

    /// Exakter Abgleich; ein fehlender Eintrag ist kein Fehler
    async fn is_token_revoked(&self, token: &str) -> DbResult<bool>;

    /// Entfernt Sperreintraege deren Token inzwischen ohnehin abgelaufen ist
    async fn purge_expired_revocations(&self, jetzt: DateTime<Utc>) -> DbResult<u64>;

    /// Upsert: erhoeht den Zaehler und setzt `last_try`
    async fn record_login_attempt(&self, email: &str) -> DbResult<()>;

    async fn get_login_attempts(&self, email: &str) -> DbResult<Option<LoginVersuchRecord>>;

    async fn reset_login_attempts(&self, email: &str) -> DbResult<()>;
}
