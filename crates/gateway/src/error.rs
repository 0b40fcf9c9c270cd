//! Fehlertypen der RPC-Grenze und ihre Abbildung auf `tonic::Status`

use thiserror::Error;
use tonic::Status;
use torwache_db::DbError;

/// Fehler der Profil-Handler und des Request-Gates
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Anmeldung erforderlich")]
    NichtAngemeldet,

    #[error("{0}")]
    KeineBerechtigung(String),

    #[error("{0}")]
    UngueltigeEingabe(String),

    #[error("Benutzer nicht gefunden")]
    NichtGefunden,

    #[error("Speicherfehler: {0}")]
    Speicher(DbError),
}

impl From<DbError> for GatewayError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NichtGefunden(_) => Self::NichtGefunden,
            andere => Self::Speicher(andere),
        }
    }
}

impl From<GatewayError> for Status {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NichtAngemeldet => Status::unauthenticated(e.to_string()),
            GatewayError::KeineBerechtigung(_) => Status::permission_denied(e.to_string()),
            GatewayError::UngueltigeEingabe(_) => Status::invalid_argument(e.to_string()),
            GatewayError::NichtGefunden => Status::not_found(e.to_string()),
            GatewayError::Speicher(ref db) => {
                // Details nur ins Log, nicht zum Client
                tracing::error!(fehler = %db, "Speicherfehler an der RPC-Grenze");
                Status::internal(INTERNER_FEHLER)
            }
        }
    }
}

/// Generische Meldung fuer Fehler, deren Details den Dienst nicht verlassen
pub const INTERNER_FEHLER: &str = "Interner Fehler";

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn status_codes() {
        assert_eq!(Status::from(GatewayError::NichtAngemeldet).code(), Code::Unauthenticated);
        assert_eq!(
            Status::from(GatewayError::KeineBerechtigung("nein".into())).code(),
            Code::PermissionDenied
        );
        assert_eq!(
            Status::from(GatewayError::UngueltigeEingabe("x".into())).code(),
            Code::InvalidArgument
        );
        assert_eq!(Status::from(GatewayError::NichtGefunden).code(), Code::NotFound);
    }

    #[test]
    fn speicherfehler_ohne_details() {
        let status = Status::from(GatewayError::Speicher(DbError::intern("geheimes Detail")));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), INTERNER_FEHLER);
    }

    #[test]
    fn nicht_gefunden_aus_db() {
        let e = GatewayError::from(DbError::nicht_gefunden("User 1"));
        assert!(matches!(e, GatewayError::NichtGefunden));
    }
}
