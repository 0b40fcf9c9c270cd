//! torwache-auth – Authentifizierungs-Kern
//!
//! Dieses Crate implementiert:
//! - Pruefung von E-Mail-Format und Passwortstaerke
//! - Passwort-Hashing mit Argon2id
//! - Session-Tokens (HS256) mit Ablaufzeit
//! - Rate Limiter fuer Login-Versuche (in-memory, mit Bereinigungs-Task)
//! - AuthService (Registrierung, Login, Logout, Token-Pruefung mit Sperrliste)

pub mod error;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod token;
pub mod validierung;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult, FehlerKategorie};
pub use password::{passwort_hashen, passwort_verifizieren, HashParameter};
pub use rate_limit::{RateLimitKonfig, RateLimiter};
pub use service::{AuthKonfig, AuthService};
pub use token::{token_ausstellen, token_pruefen, Claims, TokenFehler};
pub use validierung::{email_pruefen, passwort_pruefen};
