//! Handler fuer die Methoden des Auth-Service
//!
//! Uebersetzt zwischen Nachrichten und [`AuthService`] und bildet
//! `AuthError` je Methode auf `tonic::Status` ab.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use torwache_auth::{AuthError, AuthService, FehlerKategorie};
use torwache_db::repository::{AuthRepository, UserRepository};

use crate::{
    error::INTERNER_FEHLER,
    nachrichten::{
        LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, RegisterRequest,
        RegisterResponse,
    },
};

pub struct AuthHandler<U: UserRepository, A: AuthRepository> {
    auth: Arc<AuthService<U, A>>,
}

impl<U: UserRepository, A: AuthRepository> AuthHandler<U, A> {
    pub fn neu(auth: Arc<AuthService<U, A>>) -> Self {
        Self { auth }
    }

    pub async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let body = request.into_inner();
        let benutzer = self
            .auth
            .registrieren(&body.email, &body.password, &body.name)
            .await
            .map_err(|e| registrierung_status(&e))?;

        Ok(Response::new(RegisterResponse {
            success: true,
            message: "Benutzer erfolgreich registriert".into(),
            user_id: benutzer.id.to_string(),
        }))
    }

    pub async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let body = request.into_inner();
        let token = self
            .auth
            .anmelden(&body.email, &body.password)
            .await
            .map_err(|e| login_status(&e))?;

        Ok(Response::new(LoginResponse {
            success: true,
            message: "Anmeldung erfolgreich".into(),
            token,
        }))
    }

    pub async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let body = request.into_inner();
        self.auth
            .abmelden(&body.token)
            .await
            .map_err(|e| logout_status(&e))?;

        Ok(Response::new(LogoutResponse {
            success: true,
            message: "Abmeldung erfolgreich".into(),
        }))
    }
}

/// Interne Fehler werden geloggt und ohne Details gemeldet
fn intern(e: &AuthError) -> Status {
    tracing::error!(fehler = %e, "Interner Fehler im Auth-Handler");
    Status::internal(INTERNER_FEHLER)
}

fn registrierung_status(e: &AuthError) -> Status {
    match e.kategorie() {
        FehlerKategorie::Speicher | FehlerKategorie::Intern => intern(e),
        _ => Status::invalid_argument(e.to_string()),
    }
}

fn login_status(e: &AuthError) -> Status {
    match e.kategorie() {
        FehlerKategorie::RateLimit => Status::resource_exhausted(e.to_string()),
        FehlerKategorie::Speicher | FehlerKategorie::Intern => intern(e),
        _ => Status::unauthenticated(AuthError::UngueltigeAnmeldedaten.to_string()),
    }
}

fn logout_status(e: &AuthError) -> Status {
    match e.kategorie() {
        FehlerKategorie::Speicher | FehlerKategorie::Intern => intern(e),
        _ => Status::invalid_argument(AuthError::TokenUngueltig.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tonic::Code;
    use torwache_db::DbError;

    #[test]
    fn registrierung_meldet_validierung_unveraendert() {
        let status = registrierung_status(&AuthError::SchwachesPasswort("Passwort zu kurz".into()));
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Passwort zu kurz");

        let status = registrierung_status(&AuthError::BereitsRegistriert);
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Benutzer existiert bereits");
    }

    #[test]
    fn speicherfehler_werden_verallgemeinert() {
        let fehler = AuthError::Speicher(DbError::Zeitlimit(Duration::from_secs(5)));
        for status in [
            registrierung_status(&fehler),
            login_status(&fehler),
            logout_status(&fehler),
        ] {
            assert_eq!(status.code(), Code::Internal);
            assert_eq!(status.message(), INTERNER_FEHLER);
        }
    }

    #[test]
    fn login_codes() {
        assert_eq!(
            login_status(&AuthError::UngueltigeAnmeldedaten).code(),
            Code::Unauthenticated
        );
        assert_eq!(
            login_status(&AuthError::ZuVieleVersuche).code(),
            Code::ResourceExhausted
        );
    }

    #[test]
    fn logout_codes() {
        let status = logout_status(&AuthError::TokenUngueltig);
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Ungueltiger Token");
    }
}
