//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen und danach durch
//! Umgebungsvariablen ueberschrieben. Bis auf das Token-Secret haben
//! alle Felder sinnvolle Standardwerte.

use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use torwache_auth::{AuthKonfig, HashParameter, RateLimitKonfig};
use torwache_db::DatabaseConfig;

/// Laengstes erlaubtes Rate-Limit-Fenster (ein Tag)
pub const MAX_FENSTER_SECS: u64 = 24 * 60 * 60;
/// Laengste erlaubte Token-Gueltigkeit (ein Jahr)
pub const MAX_GUELTIGKEIT_SECS: u64 = 365 * 24 * 60 * 60;
/// Laengste erlaubte Periode der Sperrlisten-Bereinigung (ein Tag)
pub const MAX_BEREINIGUNG_SECS: u64 = 24 * 60 * 60;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Session-Token-Einstellungen
    pub token: TokenEinstellungen,
    /// Rate Limiting fuer Login-Versuche
    pub rate_limit: RateLimitEinstellungen,
    /// Argon2id-Kostenparameter
    pub passwort_hash: HashParameter,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// Port fuer den Auth-Service
    pub auth_port: u16,
    /// Port fuer den User-Service
    pub user_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            auth_port: 50051,
            user_port: 50052,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Modus aktivieren
    pub wal: bool,
    /// Zeitlimit pro Speicherzugriff in Millisekunden
    pub zeitlimit_ms: u64,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://torwache.db".into(),
            max_verbindungen: 5,
            wal: true,
            zeitlimit_ms: 5_000,
        }
    }
}

/// Session-Token-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenEinstellungen {
    /// HMAC-Secret; muss gesetzt sein
    pub secret: String,
    /// Gueltigkeit eines Tokens in Sekunden
    pub gueltigkeit_secs: u64,
    /// Abstand zwischen zwei Bereinigungen der Sperrliste in Sekunden
    pub bereinigung_secs: u64,
}

impl Default for TokenEinstellungen {
    fn default() -> Self {
        Self {
            secret: String::new(),
            gueltigkeit_secs: 24 * 60 * 60,
            bereinigung_secs: 60 * 60,
        }
    }
}

/// Rate Limiting fuer Login-Versuche
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitEinstellungen {
    /// Erlaubte Versuche pro Fenster und E-Mail
    pub max_versuche: u32,
    /// Fensterlaenge in Sekunden
    pub fenster_secs: u64,
}

impl Default for RateLimitEinstellungen {
    fn default() -> Self {
        Self {
            max_versuche: 5,
            fenster_secs: 60,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei und wendet die
    /// Umgebungsvariablen an.
    ///
    /// Fehlt die Datei, wird mit den Standardwerten weitergemacht; der
    /// zweite Wert ist dann `true`. Laeuft vor dem Logging, die Warnung
    /// gibt deshalb der Aufrufer aus.
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, bool)> {
        Self::laden_mit(pfad, |name| std::env::var(name).ok())
    }

    fn laden_mit(
        pfad: &str,
        lesen: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<(Self, bool)> {
        let (mut config, standardwerte): (Self, bool) = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => (
                toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
                false,
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Self::default(), true),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        config.umgebung_anwenden(lesen)?;
        Ok((config, standardwerte))
    }

    /// Ueberschreibt Werte aus Umgebungsvariablen
    ///
    /// `lesen` liefert den Wert einer Variable oder `None`.
    pub fn umgebung_anwenden(
        &mut self,
        lesen: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(secret) = lesen("TORWACHE_JWT_SECRET") {
            self.token.secret = secret;
        }
        if let Some(wert) = lesen("TORWACHE_JWT_EXPIRY_SECS") {
            self.token.gueltigkeit_secs = wert
                .trim()
                .parse()
                .with_context(|| format!("TORWACHE_JWT_EXPIRY_SECS ungueltig: '{wert}'"))?;
        }
        if let Some(wert) = lesen("TORWACHE_RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit.fenster_secs = wert
                .trim()
                .parse()
                .with_context(|| format!("TORWACHE_RATE_LIMIT_WINDOW_SECS ungueltig: '{wert}'"))?;
        }
        if let Some(url) = lesen("TORWACHE_DATABASE_URL") {
            self.datenbank.url = url;
        }
        Ok(())
    }

    /// Lehnt Konfigurationen ab, mit denen der Server nicht sicher laeuft
    pub fn validieren(&self) -> anyhow::Result<()> {
        if self.token.secret.trim().is_empty() {
            bail!("Token-Secret fehlt (token.secret oder TORWACHE_JWT_SECRET)");
        }
        if !(1..=MAX_FENSTER_SECS).contains(&self.rate_limit.fenster_secs) {
            bail!("rate_limit.fenster_secs muss zwischen 1 und {MAX_FENSTER_SECS} liegen");
        }
        if self.token.gueltigkeit_secs > MAX_GUELTIGKEIT_SECS {
            bail!("token.gueltigkeit_secs darf hoechstens {MAX_GUELTIGKEIT_SECS} sein");
        }
        if self.rate_limit.max_versuche == 0 {
            bail!("rate_limit.max_versuche muss groesser als 0 sein");
        }
        if !(1..=MAX_BEREINIGUNG_SECS).contains(&self.token.bereinigung_secs) {
            bail!("token.bereinigung_secs muss zwischen 1 und {MAX_BEREINIGUNG_SECS} liegen");
        }
        if self.datenbank.zeitlimit_ms == 0 {
            bail!("datenbank.zeitlimit_ms muss groesser als 0 sein");
        }
        Ok(())
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.wal,
        }
    }

    pub fn speicher_zeitlimit(&self) -> Duration {
        Duration::from_millis(self.datenbank.zeitlimit_ms)
    }

    pub fn auth_konfig(&self) -> AuthKonfig {
        AuthKonfig {
            token_secret: self.token.secret.clone(),
            token_gueltigkeit: Duration::from_secs(self.token.gueltigkeit_secs),
            speicher_zeitlimit: self.speicher_zeitlimit(),
            hash_parameter: self.passwort_hash,
        }
    }

    pub fn rate_limit_konfig(&self) -> RateLimitKonfig {
        RateLimitKonfig {
            max_versuche: self.rate_limit.max_versuche,
            fenster: Duration::from_secs(self.rate_limit.fenster_secs),
        }
    }

    /// Bind-Adresse fuer den Auth-Service
    pub fn auth_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.auth_port)
    }

    /// Bind-Adresse fuer den User-Service
    pub fn user_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.user_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn umgebung(paare: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = paare
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn standardwerte() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.datenbank.url, "sqlite://torwache.db");
        assert_eq!(cfg.datenbank.zeitlimit_ms, 5000);
        assert_eq!(cfg.token.gueltigkeit_secs, 86400);
        assert_eq!(cfg.rate_limit.max_versuche, 5);
        assert_eq!(cfg.rate_limit.fenster_secs, 60);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.passwort_hash, HashParameter::default());
    }

    #[test]
    fn standard_ohne_secret_ist_ungueltig() {
        let err = ServerConfig::default().validieren().unwrap_err();
        assert!(err.to_string().contains("Token-Secret"));
    }

    #[test]
    fn bind_adressen() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.auth_bind_adresse(), "0.0.0.0:50051");
        assert_eq!(cfg.user_bind_adresse(), "0.0.0.0:50052");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [token]
            secret = "geheim"
            gueltigkeit_secs = 600

            [rate_limit]
            max_versuche = 3

            [passwort_hash]
            speicher_kib = 8192
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.token.secret, "geheim");
        assert_eq!(cfg.token.gueltigkeit_secs, 600);
        assert_eq!(cfg.rate_limit.max_versuche, 3);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.rate_limit.fenster_secs, 60);
        assert_eq!(cfg.passwort_hash.speicher_kib, 8192);
        assert_eq!(cfg.passwort_hash.iterationen, 2);
        assert!(cfg.validieren().is_ok());
    }

    #[test]
    fn umgebung_ueberschreibt_datei() {
        let mut cfg: ServerConfig = toml::from_str(
            r#"
            [token]
            secret = "aus-datei"
        "#,
        )
        .unwrap();

        cfg.umgebung_anwenden(umgebung(&[
            ("TORWACHE_JWT_SECRET", "aus-umgebung"),
            ("TORWACHE_JWT_EXPIRY_SECS", "120"),
            ("TORWACHE_RATE_LIMIT_WINDOW_SECS", " 30 "),
            ("TORWACHE_DATABASE_URL", "sqlite://andere.db"),
        ]))
        .unwrap();

        assert_eq!(cfg.token.secret, "aus-umgebung");
        assert_eq!(cfg.token.gueltigkeit_secs, 120);
        assert_eq!(cfg.rate_limit.fenster_secs, 30);
        assert_eq!(cfg.datenbank.url, "sqlite://andere.db");
    }

    #[test]
    fn ungueltige_umgebungswerte() {
        let mut cfg = ServerConfig::default();
        let err = cfg
            .umgebung_anwenden(umgebung(&[("TORWACHE_JWT_EXPIRY_SECS", "24h")]))
            .unwrap_err();
        assert!(err.to_string().contains("TORWACHE_JWT_EXPIRY_SECS"));
    }

    #[test]
    fn null_fenster_und_null_versuche_abgelehnt() {
        let mut cfg = ServerConfig::default();
        cfg.token.secret = "geheim".into();
        assert!(cfg.validieren().is_ok());

        cfg.rate_limit.fenster_secs = 0;
        assert!(cfg.validieren().is_err());

        cfg.rate_limit.fenster_secs = 60;
        cfg.rate_limit.max_versuche = 0;
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn zu_grosse_zeitraeume_abgelehnt() {
        let mut cfg = ServerConfig::default();
        cfg.token.secret = "geheim".into();

        cfg.rate_limit.fenster_secs = MAX_FENSTER_SECS;
        assert!(cfg.validieren().is_ok());
        cfg.rate_limit.fenster_secs = u64::MAX;
        let err = cfg.validieren().unwrap_err();
        assert!(err.to_string().contains("rate_limit.fenster_secs"));

        cfg.rate_limit.fenster_secs = 60;
        cfg.token.gueltigkeit_secs = u64::MAX;
        let err = cfg.validieren().unwrap_err();
        assert!(err.to_string().contains("token.gueltigkeit_secs"));

        cfg.token.gueltigkeit_secs = 86400;
        cfg.token.bereinigung_secs = u64::MAX;
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let pfad = std::env::temp_dir().join(format!("torwache-fehlt-{}.toml", Uuid::new_v4()));
        let (cfg, standardwerte) =
            ServerConfig::laden_mit(pfad.to_str().unwrap(), umgebung(&[])).unwrap();
        assert!(standardwerte);
        assert_eq!(cfg.rate_limit.max_versuche, 5);
    }

    #[test]
    fn vorhandene_datei_wird_gelesen() {
        let pfad = std::env::temp_dir().join(format!("torwache-cfg-{}.toml", Uuid::new_v4()));
        std::fs::write(&pfad, "[token]\nsecret = \"aus-datei\"\n").unwrap();

        let ergebnis = ServerConfig::laden_mit(
            pfad.to_str().unwrap(),
            umgebung(&[("TORWACHE_JWT_EXPIRY_SECS", "90")]),
        );
        std::fs::remove_file(&pfad).ok();

        let (cfg, standardwerte) = ergebnis.unwrap();
        assert!(!standardwerte);
        assert_eq!(cfg.token.secret, "aus-datei");
        assert_eq!(cfg.token.gueltigkeit_secs, 90);
    }

    #[test]
    fn abgeleitete_konfigurationen() {
        let mut cfg = ServerConfig::default();
        cfg.token.secret = "geheim".into();
        cfg.datenbank.zeitlimit_ms = 1500;

        let auth = cfg.auth_konfig();
        assert_eq!(auth.token_secret, "geheim");
        assert_eq!(auth.speicher_zeitlimit, Duration::from_millis(1500));
        assert_eq!(auth.token_gueltigkeit, Duration::from_secs(86400));

        let limit = cfg.rate_limit_konfig();
        assert_eq!(limit.max_versuche, 5);
        assert_eq!(limit.fenster, Duration::from_secs(60));

        assert!(cfg.datenbank_config().sqlite_wal);
    }
}
