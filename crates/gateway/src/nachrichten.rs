//! Request- und Response-Nachrichten der RPC-Methoden
//!
//! Feldnamen entsprechen den Nachrichten der Auth- und User-Services.
//! Leere Strings bzw. `0` stehen fuer "nicht gesetzt".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use torwache_db::models::BenutzerRecord;

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoutRequest {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// UserService
// ---------------------------------------------------------------------------

/// Oeffentliche Sicht auf einen Benutzer, ohne Credential-Material
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Benutzer {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

fn zeitstempel(zeit: &DateTime<Utc>) -> String {
    zeit.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

impl From<&BenutzerRecord> for Benutzer {
    fn from(r: &BenutzerRecord) -> Self {
        Self {
            id: r.id.to_string(),
            email: r.email.clone(),
            name: r.name.clone(),
            created_at: zeitstempel(&r.created_at),
            updated_at: zeitstempel(&r.updated_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetProfileRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetProfileResponse {
    pub user: Option<Benutzer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: Option<Benutzer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteProfileRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteProfileResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUsersRequest {
    pub page: i32,
    pub limit: i32,
    pub name_filter: String,
    pub email_filter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUsersResponse {
    pub users: Vec<Benutzer>,
    pub total: i64,
    /// Tatsaechlich verwendete Seite nach Korrektur
    pub page: i32,
    /// Tatsaechlich verwendetes Limit nach Korrektur
    pub limit: i32,
}
