//! Request-Gate fuer alle Methoden ausserhalb des Auth-Service
//!
//! Liest `authorization: Bearer <token>` aus den Metadaten, prueft das
//! Token ueber den [`AuthService`] und legt den [`AuthKontext`] in den
//! Request. Methoden des Auth-Service selbst (Register, Login, Logout)
//! passieren ungeprueft.

use std::sync::Arc;

use tonic::{metadata::MetadataMap, Request, Status};
use torwache_auth::{AuthError, AuthService, FehlerKategorie};
use torwache_db::repository::{AuthRepository, UserRepository};

use crate::{
    error::INTERNER_FEHLER,
    kontext::{AuthKontext, AuthKontextExt},
};

/// Name des Dienstes, dessen Methoden ohne Token erreichbar sind
pub const AUTH_SERVICE_NAME: &str = "AuthService";

/// Gibt `true` zurueck wenn `methode` (z.B. `/auth.AuthService/Login`)
/// zum Auth-Service gehoert
pub fn ist_auth_methode(methode: &str) -> bool {
    let mut teile = methode.trim_start_matches('/').split('/');
    let Some(dienst) = teile.next() else {
        return false;
    };
    let dienst_name = dienst.rsplit('.').next().unwrap_or(dienst);
    dienst_name == AUTH_SERVICE_NAME
}

/// Extrahiert das Token aus `authorization: Bearer <token>`
pub fn bearer_token(metadata: &MetadataMap) -> Result<&str, Status> {
    let wert = metadata
        .get("authorization")
        .ok_or_else(|| Status::unauthenticated("Authorization-Metadaten fehlen"))?;

    let token = wert
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty() && !t.contains(' '))
        .ok_or_else(|| Status::unauthenticated("Ungueltiges Authorization-Format"))?;

    Ok(token)
}

/// Vorgeschaltete Token-Pruefung fuer geschuetzte Methoden
pub struct AnfrageGate<U: UserRepository, A: AuthRepository> {
    auth: Arc<AuthService<U, A>>,
}

impl<U: UserRepository, A: AuthRepository> Clone for AnfrageGate<U, A> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
        }
    }
}

impl<U: UserRepository, A: AuthRepository> AnfrageGate<U, A> {
    pub fn neu(auth: Arc<AuthService<U, A>>) -> Self {
        Self { auth }
    }

    /// Prueft einen eingehenden Request fuer `methode`
    ///
    /// Bei Erfolg kommt derselbe Request zurueck, fuer geschuetzte
    /// Methoden mit gesetztem [`AuthKontext`].
    pub async fn pruefen<T>(
        &self,
        methode: &str,
        mut request: Request<T>,
    ) -> Result<Request<T>, Status> {
        if ist_auth_methode(methode) {
            return Ok(request);
        }

        let token = bearer_token(request.metadata())?;

        let claims = self.auth.token_validieren(token).await.map_err(|e| {
            tracing::debug!(methode = %methode, fehler = %e, "Request vom Gate abgelehnt");
            gate_status(&e)
        })?;

        tracing::trace!(methode = %methode, user_id = %claims.user_id, "Request authentifiziert");
        request.auth_kontext_setzen(AuthKontext::from(claims));
        Ok(request)
    }
}

fn gate_status(e: &AuthError) -> Status {
    match e.kategorie() {
        FehlerKategorie::Speicher | FehlerKategorie::Intern => Status::internal(INTERNER_FEHLER),
        _ => Status::unauthenticated(AuthError::TokenUngueltig.to_string()),
    }
}
