//! Datenbankmodelle fuer Torwache
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Domain-Typen getrennt und dienen als reine Datenuebertragungsobjekte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BenutzerRecord {
    /// Entfernt das Credential-Material bevor der Datensatz den Dienst verlaesst
    pub fn ohne_passwort(mut self) -> Self {
        self.password_hash.clear();
        self
    }

    /// Gibt `true` zurueck wenn der Benutzer weich geloescht wurde
    pub fn ist_geloescht(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
}

/// Daten zum Aktualisieren eines Benutzers
///
/// Die E-Mail-Adresse ist der eindeutige Schluessel und wird nicht geaendert.
#[derive(Debug, Clone, Default)]
pub struct BenutzerUpdate {
    pub name: Option<String>,
}

/// Filter und Paginierung fuer die Benutzerliste
#[derive(Debug, Clone)]
pub struct BenutzerFilter<'a> {
    /// Seite, beginnend bei 1
    pub seite: u32,
    /// Eintraege pro Seite
    pub limit: u32,
    /// Teilstring-Filter auf den Namen (Gross-/Kleinschreibung egal)
    pub name: Option<&'a str>,
    /// Teilstring-Filter auf die E-Mail (Gross-/Kleinschreibung egal)
    pub email: Option<&'a str>,
}

impl Default for BenutzerFilter<'_> {
    fn default() -> Self {
        Self {
            seite: 1,
            limit: 10,
            name: None,
            email: None,
        }
    }
}

impl BenutzerFilter<'_> {
    /// Anzahl zu ueberspringender Datensaetze
    pub fn offset(&self) -> u64 {
        u64::from(self.seite.saturating_sub(1)) * u64::from(self.limit)
    }
}

// ---------------------------------------------------------------------------
// Token-Sperrliste
// ---------------------------------------------------------------------------

/// Eintrag der Token-Sperrliste (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SperrRecord {
    pub token: String,
    pub user_id: Uuid,
    pub revoked_at: DateTime<Utc>,
    /// Natuerlicher Ablauf des gesperrten Tokens, danach ist der Eintrag entbehrlich
    pub expires_at: DateTime<Utc>,
}

/// Daten zum Sperren eines Tokens
#[derive(Debug, Clone)]
pub struct NeueSperre<'a> {
    pub token: &'a str,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Login-Versuche
// ---------------------------------------------------------------------------

/// Persistierter Zaehler fehlgeschlagener bzw. laufender Login-Versuche
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginVersuchRecord {
    pub email: String,
    pub attempts: i64,
    pub last_try: DateTime<Utc>,
    pub blocked_at: Option<DateTime<Utc>>,
}
