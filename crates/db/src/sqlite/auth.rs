//! SQLite-Implementierung des AuthRepository (Token-Sperrliste, Login-Versuche)

use chrono::{DateTime, Utc};

use crate::models::{LoginVersuchRecord, NeueSperre};
use crate::repository::{AuthRepository, DbResult};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{zeit_parsen, zeit_parsen_optional, zeit_text};

impl AuthRepository for SqliteDb {
    async fn revoke_token(&self, data: NeueSperre<'_>) -> DbResult<()> {
        // Mehrfaches Sperren desselben Tokens ist kein Fehler
        sqlx::query(
            "INSERT OR IGNORE INTO revoked_tokens (token, user_id, revoked_at, expires_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(data.token)
        .bind(data.user_id.to_string())
        .bind(zeit_text(&Utc::now()))
        .bind(zeit_text(&data.expires_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_token_revoked(&self, token: &str) -> DbResult<bool> {
        let treffer: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM revoked_tokens WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(treffer.is_some())
    }

    async fn purge_expired_revocations(&self, jetzt: DateTime<Utc>) -> DbResult<u64> {
        let entfernt = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= ?")
            .bind(zeit_text(&jetzt))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(entfernt)
    }

    async fn record_login_attempt(&self, email: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO login_attempts (email, attempts, last_try) VALUES (?, 1, ?)
             ON CONFLICT(email) DO UPDATE SET
                 attempts = attempts + 1,
                 last_try = excluded.last_try",
        )
        .bind(email)
        .bind(zeit_text(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_login_attempts(&self, email: &str) -> DbResult<Option<LoginVersuchRecord>> {
        use sqlx::Row as _;

        let row = sqlx::query(
            "SELECT email, attempts, last_try, blocked_at FROM login_attempts WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let last_try: String = row.try_get("last_try")?;
        let blocked_at: Option<String> = row.try_get("blocked_at")?;

        Ok(Some(LoginVersuchRecord {
            email: row.try_get("email")?,
            attempts: row.try_get("attempts")?,
            last_try: zeit_parsen("last_try", &last_try)?,
            blocked_at: zeit_parsen_optional("blocked_at", blocked_at)?,
        }))
    }

    async fn reset_login_attempts(&self, email: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM login_attempts WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
