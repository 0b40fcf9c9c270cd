//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod auth;
pub mod pool;
pub mod users;

pub use pool::SqliteDb;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DbError;

/// Einheitliches Textformat fuer Zeitstempel, damit lexikografische
/// Vergleiche in SQL der zeitlichen Reihenfolge entsprechen
pub(crate) fn zeit_text(zeit: &DateTime<Utc>) -> String {
    zeit.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn zeit_parsen(feld: &str, wert: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige {feld} '{wert}': {e}")))
}

pub(crate) fn zeit_parsen_optional(
    feld: &str,
    wert: Option<String>,
) -> Result<Option<DateTime<Utc>>, DbError> {
    wert.as_deref().map(|s| zeit_parsen(feld, s)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zeit_text_ist_sortierbar() {
        let frueh = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 5).unwrap();
        let spaet = frueh + chrono::Duration::milliseconds(500);
        assert!(zeit_text(&frueh) < zeit_text(&spaet));
    }

    #[test]
    fn zeit_roundtrip() {
        let zeit = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap();
        let text = zeit_text(&zeit);
        assert_eq!(zeit_parsen("created_at", &text).unwrap(), zeit);
        assert!(zeit_parsen("created_at", "gestern").is_err());
    }
}
