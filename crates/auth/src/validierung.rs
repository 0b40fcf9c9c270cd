//! Pruefung von E-Mail-Adressen und Passwortstaerke
//!
//! Reine Funktionen ohne Seiteneffekte. Die Fehlermeldungen gehen
//! unveraendert an den Client.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AuthError, AuthResult};

/// Mindestlaenge eines Passworts in Bytes
pub const MIN_PASSWORT_LAENGE: usize = 8;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("E-Mail-Regex ist ungueltig")
});

/// Prueft die Form `lokal@domain.tld`
pub fn email_pruefen(email: &str) -> AuthResult<()> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(AuthError::UngueltigeEmail)
    }
}

/// Prueft Laenge sowie Gross-, Kleinbuchstaben und Ziffern (ASCII)
///
/// Sonderzeichen sind erlaubt, aber nicht gefordert.
pub fn passwort_pruefen(passwort: &str) -> AuthResult<()> {
    if passwort.len() < MIN_PASSWORT_LAENGE {
        return Err(AuthError::SchwachesPasswort(format!(
            "Passwort muss mindestens {MIN_PASSWORT_LAENGE} Zeichen lang sein"
        )));
    }

    let hat_gross = passwort.chars().any(|c| c.is_ascii_uppercase());
    let hat_klein = passwort.chars().any(|c| c.is_ascii_lowercase());
    let hat_ziffer = passwort.chars().any(|c| c.is_ascii_digit());

    if !(hat_gross && hat_klein && hat_ziffer) {
        return Err(AuthError::SchwachesPasswort(
            "Passwort muss mindestens einen Grossbuchstaben, einen Kleinbuchstaben \
             und eine Ziffer enthalten"
                .into(),
        ));
    }

    Ok(())
}
