//! Session-Tokens (HS256-signiert)
//!
//! Zustandslos: ein Token traegt Benutzer-ID, E-Mail sowie Ausstellungs-
//! und Ablaufzeit. Zwei Ausstellungen im selben Prozess ergeben nie
//! dasselbe Token, auch nicht innerhalb einer Sekunde. Widerruf wird
//! nicht hier, sondern im `AuthService` ueber die Sperrliste geprueft.

use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Inhalt eines Session-Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    /// Ausstellungszeit (Unix-Sekunden)
    pub iat: i64,
    /// Ablaufzeit (Unix-Sekunden)
    pub exp: i64,
    /// Ausstellungszeit in Nanosekunden, pro Prozess streng steigend
    #[serde(default)]
    pub iat_ns: i64,
}

/// Zuletzt vergebener Nanosekunden-Stempel
static LETZTER_STEMPEL: AtomicI64 = AtomicI64::new(0);

/// Liefert einen Stempel, der groesser ist als jeder zuvor vergebene
fn ausstellungs_stempel(jetzt_ns: i64) -> i64 {
    let mut letzter = LETZTER_STEMPEL.load(Ordering::Relaxed);
    loop {
        let neu = jetzt_ns.max(letzter.saturating_add(1));
        match LETZTER_STEMPEL.compare_exchange_weak(
            letzter,
            neu,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return neu,
            Err(aktuell) => letzter = aktuell,
        }
    }
}

/// Fehler bei der Token-Pruefung
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenFehler {
    #[error("Signatur ungueltig")]
    UngueltigeSignatur,

    #[error("Token abgelaufen")]
    Abgelaufen,

    #[error("Token fehlerhaft: {0}")]
    Fehlerhaft(String),
}

/// Stellt ein signiertes Token aus, gueltig fuer `gueltigkeit` ab jetzt
pub fn token_ausstellen(
    user_id: Uuid,
    email: &str,
    secret: &str,
    gueltigkeit: Duration,
) -> Result<String, TokenFehler> {
    let jetzt = Utc::now();
    let iat = jetzt.timestamp();
    let iat_ns = ausstellungs_stempel(
        jetzt
            .timestamp_nanos_opt()
            .unwrap_or_else(|| iat.saturating_mul(1_000_000_000)),
    );
    let ttl = i64::try_from(gueltigkeit.as_secs())
        .map_err(|_| TokenFehler::Fehlerhaft("Gueltigkeit zu gross".into()))?;

    let claims = Claims {
        user_id,
        email: email.to_string(),
        iat,
        exp: iat.saturating_add(ttl),
        iat_ns,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenFehler::Fehlerhaft(e.to_string()))
}

/// Prueft Struktur, Signatur und Ablauf eines Tokens
///
/// Abgelehnt wird, sobald `jetzt >= exp`. Beliebige Eingaben fuehren zu
/// einem Fehler, nie zu einem Panic.
pub fn token_pruefen(token: &str, secret: &str) -> Result<Claims, TokenFehler> {
    let mut validierung = Validation::new(Algorithm::HS256);
    // Ablauf wird unten ohne Leeway selbst geprueft
    validierung.validate_exp = false;
    validierung.leeway = 0;

    let daten = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validierung,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenFehler::UngueltigeSignatur,
        ErrorKind::ExpiredSignature => TokenFehler::Abgelaufen,
        _ => TokenFehler::Fehlerhaft(e.to_string()),
    })?;

    if Utc::now().timestamp() >= daten.claims.exp {
        return Err(TokenFehler::Abgelaufen);
    }

    Ok(daten.claims)
}
