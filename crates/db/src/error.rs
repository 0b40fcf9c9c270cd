//! Fehlertypen fuer das Datenbank-Crate

use std::time::Duration;

use thiserror::Error;

/// Datenbank-Fehlertypen
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Datensatz nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Eindeutigkeitsverletzung: {0}")]
    Eindeutigkeit(String),

    #[error("Ungueltige Daten: {0}")]
    UngueltigeDaten(String),

    #[error("SQLx-Fehler: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration-Fehler: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Zeitlimit ueberschritten nach {0:?}")]
    Zeitlimit(Duration),

    #[error("Interner DB-Fehler: {0}")]
    Intern(String),
}

impl DbError {
    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn es sich um einen Eindeutigkeitsfehler handelt
    pub fn ist_eindeutigkeit(&self) -> bool {
        matches!(self, Self::Eindeutigkeit(_))
            || matches!(self, Self::Sqlx(e) if {
                let msg = e.to_string();
                msg.contains("UNIQUE") || msg.contains("unique")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eindeutigkeit_wird_erkannt() {
        assert!(DbError::Eindeutigkeit("email".into()).ist_eindeutigkeit());
        assert!(!DbError::nicht_gefunden("user").ist_eindeutigkeit());
        assert!(!DbError::intern("kaputt").ist_eindeutigkeit());
    }

    #[test]
    fn fehlermeldungen() {
        assert_eq!(
            DbError::nicht_gefunden("User 42").to_string(),
            "Datensatz nicht gefunden: User 42"
        );
        assert_eq!(
            DbError::Zeitlimit(Duration::from_secs(5)).to_string(),
            "Zeitlimit ueberschritten nach 5s"
        );
    }
}
