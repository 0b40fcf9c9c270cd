//! Request-gebundener Auth-Kontext
//!
//! Das Gate legt nach erfolgreicher Token-Pruefung einen [`AuthKontext`]
//! in die Extensions des Requests. Handler lesen ihn ueber
//! [`AuthKontextExt`] typisiert aus.

use tonic::Request;
use torwache_auth::Claims;
use uuid::Uuid;

/// Identitaet des Aufrufers, wie sie das Token belegt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthKontext {
    user_id: Uuid,
    email: String,
}

impl AuthKontext {
    pub fn neu(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl From<Claims> for AuthKontext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Typisierter Zugriff auf den Auth-Kontext eines Requests
pub trait AuthKontextExt {
    /// `None` wenn der Request nicht durch das Gate gelaufen ist
    fn auth_kontext(&self) -> Option<&AuthKontext>;

    fn auth_kontext_setzen(&mut self, kontext: AuthKontext);
}

impl<T> AuthKontextExt for Request<T> {
    fn auth_kontext(&self) -> Option<&AuthKontext> {
        self.extensions().get::<AuthKontext>()
    }

    fn auth_kontext_setzen(&mut self, kontext: AuthKontext) {
        self.extensions_mut().insert(kontext);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kontext_setzen_und_lesen() {
        let id = Uuid::new_v4();
        let mut request = Request::new(());
        assert!(request.auth_kontext().is_none());

        request.auth_kontext_setzen(AuthKontext::neu(id, "a@b.com"));

        let kontext = request.auth_kontext().expect("Kontext fehlt");
        assert_eq!(kontext.user_id(), id);
        assert_eq!(kontext.email(), "a@b.com");
    }

    #[test]
    fn aus_claims() {
        let id = Uuid::new_v4();
        let kontext = AuthKontext::from(Claims {
            user_id: id,
            email: "x@y.de".into(),
            iat: 0,
            exp: 1,
            iat_ns: 0,
        });
        assert_eq!(kontext, AuthKontext::neu(id, "x@y.de"));
    }
}
