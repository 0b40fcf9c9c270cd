//! SQLite-Implementierung des UserRepository

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{BenutzerFilter, BenutzerRecord, BenutzerUpdate, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{zeit_parsen, zeit_parsen_optional, zeit_text};

const SPALTEN: &str = "id, email, password_hash, name, created_at, updated_at, deleted_at";

impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let now_str = zeit_text(&now);

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.name)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("unique") {
                DbError::Eindeutigkeit(format!("E-Mail '{}' bereits vergeben", data.email))
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(BenutzerRecord {
            id,
            email: data.email.to_string(),
            password_hash: data.password_hash.to_string(),
            name: data.name.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<BenutzerRecord>> {
        let sql = format!("SELECT {SPALTEN} FROM users WHERE id = ? AND deleted_at IS NULL");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
        let sql = format!("SELECT {SPALTEN} FROM users WHERE email = ? AND deleted_at IS NULL");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update(&self, id: Uuid, data: BenutzerUpdate) -> DbResult<BenutzerRecord> {
        let Some(name) = data.name else {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("User {id}")));
        };

        let affected = sqlx::query(
            "UPDATE users SET name = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&name)
        .bind(zeit_text(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("User {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("User nach Update nicht gefunden"))
    }

    async fn soft_delete(&self, id: Uuid) -> DbResult<bool> {
        let affected =
            sqlx::query("UPDATE users SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(zeit_text(&Utc::now()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await?
                .rows_affected();
        Ok(affected > 0)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list(&self, filter: BenutzerFilter<'_>) -> DbResult<(Vec<BenutzerRecord>, u64)> {
        // Dynamisches WHERE – nur gesetzte Filter anwenden
        let mut bedingungen = vec!["deleted_at IS NULL"];
        let mut muster: Vec<String> = Vec::new();
        if let Some(name) = filter.name.filter(|s| !s.is_empty()) {
            bedingungen.push("name LIKE ? ESCAPE '\\'");
            muster.push(like_muster(name));
        }
        if let Some(email) = filter.email.filter(|s| !s.is_empty()) {
            bedingungen.push("email LIKE ? ESCAPE '\\'");
            muster.push(like_muster(email));
        }
        let where_klausel = bedingungen.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) FROM users WHERE {where_klausel}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for m in &muster {
            count_q = count_q.bind(m);
        }
        let gesamt = count_q.fetch_one(&self.pool).await?;

        let sql = format!(
            "SELECT {SPALTEN} FROM users WHERE {where_klausel}
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        );
        let mut q = sqlx::query(&sql);
        for m in &muster {
            q = q.bind(m);
        }
        let offset = i64::try_from(filter.offset())
            .map_err(|_| DbError::UngueltigeDaten("Offset zu gross".into()))?;
        q = q.bind(i64::from(filter.limit)).bind(offset);

        let rows = q.fetch_all(&self.pool).await?;
        let benutzer = rows
            .iter()
            .map(row_to_benutzer)
            .collect::<DbResult<Vec<_>>>()?;

        Ok((benutzer, gesamt.max(0) as u64))
    }
}

/// Teilstring-Muster fuer LIKE; `%`, `_` und `\` aus der Eingabe werden maskiert
fn like_muster(eingabe: &str) -> String {
    let mut muster = String::with_capacity(eingabe.len() + 2);
    muster.push('%');
    for c in eingabe.chars() {
        if matches!(c, '%' | '_' | '\\') {
            muster.push('\\');
        }
        muster.push(c);
    }
    muster.push('%');
    muster
}

fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let deleted_at: Option<String> = row.try_get("deleted_at")?;

    Ok(BenutzerRecord {
        id,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
        deleted_at: zeit_parsen_optional("deleted_at", deleted_at)?,
    })
}
