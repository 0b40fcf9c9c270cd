//! torwache-gateway – RPC-Grenze des Auth-Kerns
//!
//! Stellt die Handler fuer Auth- und User-Service bereit, das
//! vorgeschaltete Token-Gate und den typisierten Request-Kontext.
//! Die Handler arbeiten auf `tonic::Request`/`Response`/`Status`; das
//! Einhaengen in einen konkreten Transport ist Sache des Servers.

pub mod auth_handler;
pub mod error;
pub mod gate;
pub mod kontext;
pub mod nachrichten;
pub mod profil;

pub use auth_handler::AuthHandler;
pub use error::{GatewayError, GatewayResult};
pub use gate::{bearer_token, ist_auth_methode, AnfrageGate};
pub use kontext::{AuthKontext, AuthKontextExt};
pub use profil::{ProfilHandler, ProfilService};
