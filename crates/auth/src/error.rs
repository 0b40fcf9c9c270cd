//! Fehlertypen fuer den Auth-Service

use thiserror::Error;
use torwache_db::DbError;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Validierung ---
    #[error("Ungueltiges E-Mail-Format")]
    UngueltigeEmail,

    #[error("{0}")]
    SchwachesPasswort(String),

    // --- Registrierung ---
    #[error("Benutzer existiert bereits")]
    BereitsRegistriert,

    // --- Authentifizierung ---
    #[error("Ungueltige Anmeldedaten")]
    UngueltigeAnmeldedaten,

    #[error("Zu viele Login-Versuche, bitte spaeter erneut versuchen")]
    ZuVieleVersuche,

    // --- Token ---
    #[error("Ungueltiger Token")]
    TokenUngueltig,

    #[error("Token wurde widerrufen")]
    TokenWiderrufen,

    // --- Speicher ---
    #[error("Speicherfehler: {0}")]
    Speicher(#[from] DbError),

    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

/// Grobe Fehlerklasse, nach der die Aufrufer-Schicht ihre Antwort waehlt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FehlerKategorie {
    /// Fehler des Clients, Meldung wird unveraendert weitergegeben
    Validierung,
    /// Doppelte Registrierung
    Konflikt,
    /// Anmeldedaten oder Token ungueltig, absichtlich ohne Details
    Authentifizierung,
    /// Zu viele Versuche
    RateLimit,
    /// Backend-Speicher nicht verfuegbar oder fehlerhaft
    Speicher,
    Intern,
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn kategorie(&self) -> FehlerKategorie {
        match self {
            Self::UngueltigeEmail | Self::SchwachesPasswort(_) => FehlerKategorie::Validierung,
            Self::BereitsRegistriert => FehlerKategorie::Konflikt,
            Self::UngueltigeAnmeldedaten | Self::TokenUngueltig | Self::TokenWiderrufen => {
                FehlerKategorie::Authentifizierung
            }
            Self::ZuVieleVersuche => FehlerKategorie::RateLimit,
            Self::Speicher(_) => FehlerKategorie::Speicher,
            Self::PasswortHashing(_) | Self::Intern(_) => FehlerKategorie::Intern,
        }
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn kategorien() {
        assert_eq!(AuthError::UngueltigeEmail.kategorie(), FehlerKategorie::Validierung);
        assert_eq!(
            AuthError::SchwachesPasswort("zu kurz".into()).kategorie(),
            FehlerKategorie::Validierung
        );
        assert_eq!(AuthError::BereitsRegistriert.kategorie(), FehlerKategorie::Konflikt);
        assert_eq!(
            AuthError::TokenWiderrufen.kategorie(),
            FehlerKategorie::Authentifizierung
        );
        assert_eq!(AuthError::ZuVieleVersuche.kategorie(), FehlerKategorie::RateLimit);
        assert_eq!(
            AuthError::from(DbError::Zeitlimit(Duration::from_secs(5))).kategorie(),
            FehlerKategorie::Speicher
        );
    }

    #[test]
    fn schwaches_passwort_meldung_unveraendert() {
        let err = AuthError::SchwachesPasswort("Passwort zu kurz".into());
        assert_eq!(err.to_string(), "Passwort zu kurz");
    }
}
