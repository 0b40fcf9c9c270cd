//! Passwort-Hashing mit Argon2id
//!
//! Langsamer, gesalzener Einweg-Hash. Die Parameter landen im PHC-String,
//! die Verifikation liest sie von dort und ist daher unabhaengig von der
//! aktuellen Konfiguration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Kostenparameter fuer Argon2id
///
/// Standardwerte entsprechen der OWASP-Mindestempfehlung
/// (19 MiB, 2 Iterationen, 1 Thread), etwa 100ms auf ueblicher Hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashParameter {
    pub speicher_kib: u32,
    pub iterationen: u32,
    pub parallelitaet: u32,
}

impl Default for HashParameter {
    fn default() -> Self {
        Self {
            speicher_kib: 19 * 1024,
            iterationen: 2,
            parallelitaet: 1,
        }
    }
}

impl HashParameter {
    fn argon2(&self) -> AuthResult<Argon2<'static>> {
        let params = Params::new(self.speicher_kib, self.iterationen, self.parallelitaet, None)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltige Argon2-Parameter: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hasht ein Passwort mit Argon2id und einem zufaelligen Salt
///
/// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
/// Blockiert fuer die Dauer des Hashings, im async-Kontext ueber
/// `spawn_blocking` aufrufen.
pub fn passwort_hashen(passwort: &str, parameter: &HashParameter) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    parameter
        .argon2()?
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswortHashing(e.to_string()))
}

/// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
///
/// Gibt `true` zurueck wenn das Passwort korrekt ist. Der Vergleich
/// der Hash-Ausgabe erfolgt in konstanter Zeit.
pub fn passwort_verifizieren(passwort: &str, hash: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

    match Argon2::default().verify_password(passwort.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guenstig() -> HashParameter {
        HashParameter {
            speicher_kib: 1024,
            iterationen: 1,
            parallelitaet: 1,
        }
    }

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let passwort = "Sicheres_Passwort_123!";
        let hash = passwort_hashen(passwort, &guenstig()).expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$"),
            "Hash muss mit $argon2id$ beginnen"
        );
        assert!(hash.contains("m=1024,t=1,p=1"));

        let korrekt = passwort_verifizieren(passwort, &hash).expect("Verifikation fehlgeschlagen");
        assert!(korrekt, "Passwort muss korrekt verifiziert werden");
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let hash = passwort_hashen("Richtig123", &guenstig()).expect("Hashing fehlgeschlagen");

        let korrekt =
            passwort_verifizieren("Falsch123", &hash).expect("Verifikation fehlgeschlagen");
        assert!(!korrekt, "Falsches Passwort muss abgelehnt werden");
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let hash1 = passwort_hashen("Gleich123", &guenstig()).expect("Hashing 1 fehlgeschlagen");
        let hash2 = passwort_hashen("Gleich123", &guenstig()).expect("Hashing 2 fehlgeschlagen");

        assert_ne!(hash1, hash2, "Salt muss pro Hash neu erzeugt werden");
    }

    #[test]
    fn ungueltiges_hash_format_gibt_fehler() {
        let ergebnis = passwort_verifizieren("passwort", "kein_gueltiger_hash");
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }

    #[test]
    fn ungueltige_parameter_gibt_fehler() {
        let parameter = HashParameter {
            speicher_kib: 1,
            iterationen: 0,
            parallelitaet: 1,
        };
        let ergebnis = passwort_hashen("Passw0rd", &parameter);
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }

    #[test]
    fn standardparameter() {
        let p = HashParameter::default();
        assert_eq!(p.speicher_kib, 19456);
        assert_eq!(p.iterationen, 2);
        assert_eq!(p.parallelitaet, 1);
    }
}
