//! Auth-Service fuer Torwache
//!
//! Zentraler Service fuer Registrierung, Login, Logout und Token-Pruefung.
//! Serverseitig wird kein Session-Zustand gehalten: ob ein Aufrufer
//! angemeldet ist, ergibt sich pro Anfrage aus dem Token und der
//! Sperrliste.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use torwache_db::{
    models::{BenutzerRecord, NeueSperre, NeuerBenutzer},
    repository::{AuthRepository, UserRepository},
    DbError, DbResult,
};

use crate::{
    error::{AuthError, AuthResult},
    password::{passwort_hashen, passwort_verifizieren, HashParameter},
    rate_limit::RateLimiter,
    token::{token_ausstellen, token_pruefen, Claims},
    validierung::{email_pruefen, passwort_pruefen},
};

/// Laufzeitparameter des Auth-Service
#[derive(Debug, Clone)]
pub struct AuthKonfig {
    /// HMAC-Secret fuer Session-Tokens
    pub token_secret: String,
    /// Gueltigkeitsdauer ausgestellter Tokens
    pub token_gueltigkeit: Duration,
    /// Obergrenze fuer jeden einzelnen Speicherzugriff
    pub speicher_zeitlimit: Duration,
    pub hash_parameter: HashParameter,
}

impl AuthKonfig {
    pub fn neu(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_gueltigkeit: Duration::from_secs(24 * 60 * 60),
            speicher_zeitlimit: Duration::from_secs(5),
            hash_parameter: HashParameter::default(),
        }
    }
}

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<U: UserRepository, A: AuthRepository> {
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    rate_limiter: Arc<RateLimiter>,
    konfig: AuthKonfig,
}

impl<U: UserRepository, A: AuthRepository> AuthService<U, A> {
    /// Erstellt einen neuen AuthService
    pub fn neu(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        rate_limiter: Arc<RateLimiter>,
        konfig: AuthKonfig,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            rate_limiter,
            konfig,
        }
    }

    /// Registriert einen neuen Benutzer
    ///
    /// Der zurueckgegebene Record enthaelt keinen Passwort-Hash.
    pub async fn registrieren(
        &self,
        email: &str,
        passwort: &str,
        name: &str,
    ) -> AuthResult<BenutzerRecord> {
        email_pruefen(email)?;
        passwort_pruefen(passwort)?;

        if self
            .speicher(self.user_repo.get_by_email(email))
            .await?
            .is_some()
        {
            return Err(AuthError::BereitsRegistriert);
        }

        let passwort_hash = self.hashen(passwort).await?;

        let benutzer = match self
            .speicher(self.user_repo.create(NeuerBenutzer {
                email,
                password_hash: &passwort_hash,
                name,
            }))
            .await
        {
            Ok(benutzer) => benutzer,
            // Paralleler Insert oder soft-geloeschter Benutzer mit gleicher E-Mail
            Err(e) if e.ist_eindeutigkeit() => return Err(AuthError::BereitsRegistriert),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            user_id = %benutzer.id,
            email = %benutzer.email,
            "Neuer Benutzer registriert"
        );

        Ok(benutzer.ohne_passwort())
    }

    /// Meldet einen Benutzer an und stellt ein Session-Token aus
    ///
    /// Unbekannte E-Mail und falsches Passwort liefern denselben Fehler.
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<String> {
        // Vor jedem Speicherzugriff und vor dem Hashing
        if !self.rate_limiter.erlauben(email) {
            tracing::warn!(email = %email, "Login wegen Rate Limit abgelehnt");
            return Err(AuthError::ZuVieleVersuche);
        }

        if let Err(e) = self
            .speicher(self.auth_repo.record_login_attempt(email))
            .await
        {
            tracing::warn!(
                email = %email,
                fehler = %e,
                "Login-Versuch konnte nicht protokolliert werden"
            );
        }

        let benutzer = self
            .speicher(self.user_repo.get_by_email(email))
            .await?
            .ok_or(AuthError::UngueltigeAnmeldedaten)?;

        let korrekt = match self.verifizieren(passwort, &benutzer.password_hash).await {
            Ok(korrekt) => korrekt,
            Err(AuthError::PasswortHashing(e)) => {
                tracing::error!(
                    user_id = %benutzer.id,
                    fehler = %e,
                    "Gespeicherter Passwort-Hash unlesbar"
                );
                false
            }
            Err(e) => return Err(e),
        };
        if !korrekt {
            tracing::warn!(email = %email, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let token = token_ausstellen(
            benutzer.id,
            &benutzer.email,
            &self.konfig.token_secret,
            self.konfig.token_gueltigkeit,
        )
        .map_err(|e| AuthError::intern(format!("Token konnte nicht ausgestellt werden: {e}")))?;

        if let Err(e) = self
            .speicher(self.auth_repo.reset_login_attempts(email))
            .await
        {
            tracing::warn!(
                email = %email,
                fehler = %e,
                "Login-Versuche konnten nicht zurueckgesetzt werden"
            );
        }

        tracing::info!(user_id = %benutzer.id, "Benutzer angemeldet");

        Ok(token)
    }

    /// Widerruft ein noch gueltiges Token
    ///
    /// Wiederholtes Abmelden mit demselben Token ist kein Fehler.
    pub async fn abmelden(&self, token: &str) -> AuthResult<()> {
        let claims = token_pruefen(token, &self.konfig.token_secret).map_err(|e| {
            tracing::debug!(fehler = %e, "Abmeldung mit ungueltigem Token");
            AuthError::TokenUngueltig
        })?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::intern("Ablaufzeit ausserhalb des gueltigen Bereichs"))?;

        self.speicher(self.auth_repo.revoke_token(NeueSperre {
            token,
            user_id: claims.user_id,
            expires_at,
        }))
        .await?;

        tracing::info!(user_id = %claims.user_id, "Benutzer abgemeldet, Token widerrufen");
        Ok(())
    }

    /// Prueft ein Token gegen Sperrliste, Signatur und Ablauf
    ///
    /// Wird sowohl vom Request-Gate als auch von Handlern genutzt, die
    /// Entscheidungen anhand der Benutzer-ID treffen.
    pub async fn token_validieren(&self, token: &str) -> AuthResult<Claims> {
        if self
            .speicher(self.auth_repo.is_token_revoked(token))
            .await?
        {
            return Err(AuthError::TokenWiderrufen);
        }

        token_pruefen(token, &self.konfig.token_secret).map_err(|e| {
            tracing::debug!(fehler = %e, "Token-Pruefung fehlgeschlagen");
            AuthError::TokenUngueltig
        })
    }

    /// Entfernt Sperreintraege von Tokens, die ohnehin abgelaufen sind
    pub async fn sperrliste_bereinigen(&self) -> AuthResult<u64> {
        let entfernt = self
            .speicher(self.auth_repo.purge_expired_revocations(Utc::now()))
            .await?;
        if entfernt > 0 {
            tracing::debug!(anzahl = entfernt, "Abgelaufene Sperreintraege entfernt");
        }
        Ok(entfernt)
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Begrenzt einen Speicherzugriff auf das konfigurierte Zeitlimit
    async fn speicher<T>(&self, vorgang: impl Future<Output = DbResult<T>>) -> DbResult<T> {
        let zeitlimit = self.konfig.speicher_zeitlimit;
        match tokio::time::timeout(zeitlimit, vorgang).await {
            Ok(ergebnis) => ergebnis,
            Err(_) => {
                tracing::error!(zeitlimit = ?zeitlimit, "Speicherzugriff abgebrochen");
                Err(DbError::Zeitlimit(zeitlimit))
            }
        }
    }

    async fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let passwort = passwort.to_string();
        let parameter = self.konfig.hash_parameter;
        tokio::task::spawn_blocking(move || passwort_hashen(&passwort, &parameter))
            .await
            .map_err(|e| AuthError::intern(format!("Hashing-Task abgebrochen: {e}")))?
    }

    async fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool> {
        let passwort = passwort.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || passwort_verifizieren(&passwort, &hash))
            .await
            .map_err(|e| AuthError::intern(format!("Verifikations-Task abgebrochen: {e}")))?
    }
}
