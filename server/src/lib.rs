//! torwache-server – Bibliotheks-Root
//!
//! Baut aus der Konfiguration Datenbank, Auth-Service, Rate Limiter und
//! Handler zusammen und betreibt die Hintergrundaufgaben bis zum
//! Shutdown-Signal.

pub mod config;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::sync::watch;

use config::ServerConfig;
use torwache_auth::{AuthService, RateLimiter};
use torwache_db::SqliteDb;
use torwache_gateway::{AnfrageGate, AuthHandler, ProfilHandler, ProfilService};

/// Konkreter Auth-Service auf SQLite
pub type SqliteAuthService = AuthService<SqliteDb, SqliteDb>;

/// Alle fertig verdrahteten Dienste
pub struct Dienste {
    pub db: Arc<SqliteDb>,
    pub auth: Arc<SqliteAuthService>,
    pub auth_handler: AuthHandler<SqliteDb, SqliteDb>,
    /// User-Service-Handler mit vorgeschaltetem Gate
    pub profil_handler: ProfilHandler<SqliteDb, SqliteDb>,
}

impl Dienste {
    /// Oeffnet die Datenbank und verdrahtet alle Dienste
    ///
    /// Startet den Bereinigungs-Task des Rate Limiters, muss also
    /// innerhalb der Runtime laufen.
    pub async fn aufbauen(config: &ServerConfig) -> Result<Self> {
        let db = Arc::new(
            SqliteDb::oeffnen(&config.datenbank_config())
                .await
                .context("Datenbank konnte nicht geoeffnet werden")?,
        );

        let rate_limiter = RateLimiter::neu(config.rate_limit_konfig());
        let auth = Arc::new(AuthService::neu(
            Arc::clone(&db),
            Arc::clone(&db),
            rate_limiter,
            config.auth_konfig(),
        ));
        let profile = Arc::new(ProfilService::neu(
            Arc::clone(&db),
            config.speicher_zeitlimit(),
        ));

        Ok(Self {
            auth_handler: AuthHandler::neu(Arc::clone(&auth)),
            profil_handler: ProfilHandler::neu(profile, AnfrageGate::neu(Arc::clone(&auth))),
            auth,
            db,
        })
    }

    /// Stoppt Hintergrundaufgaben und schliesst die Datenbank
    pub async fn herunterfahren(&self) {
        self.auth.rate_limiter().beenden();
        self.db.schliessen().await;
    }
}

/// Bereinigt die Sperrliste periodisch bis zum Shutdown-Signal
pub async fn sperrliste_bereinigung(
    auth: Arc<SqliteAuthService>,
    periode: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut takt = tokio::time::interval(periode);

    loop {
        tokio::select! {
            _ = takt.tick() => {
                if let Err(e) = auth.sperrliste_bereinigen().await {
                    tracing::warn!(fehler = %e, "Bereinigung der Sperrliste fehlgeschlagen");
                }
            }
            ergebnis = shutdown_rx.changed() => {
                if ergebnis.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Sperrlisten-Bereinigung beendet");
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Konfiguration pruefen
    /// 2. Datenbank oeffnen und Dienste verdrahten
    /// 3. Sperrlisten-Bereinigung starten
    /// 4. Auf Ctrl-C warten, dann geordnet herunterfahren
    pub async fn starten(self) -> Result<()> {
        self.config.validieren()?;

        let dienste = Dienste::aufbauen(&self.config).await?;

        tracing::info!(
            auth = %self.config.auth_bind_adresse(),
            user = %self.config.user_bind_adresse(),
            datenbank = %self.config.datenbank.url,
            max_versuche = self.config.rate_limit.max_versuche,
            fenster_secs = self.config.rate_limit.fenster_secs,
            "Server startet"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let bereinigung = tokio::spawn(sperrliste_bereinigung(
            Arc::clone(&dienste.auth),
            Duration::from_secs(self.config.token.bereinigung_secs),
            shutdown_rx,
        ));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        let _ = shutdown_tx.send(true);
        if let Err(e) = bereinigung.await {
            tracing::warn!(fehler = %e, "Bereinigungs-Task nicht sauber beendet");
        }
        dienste.herunterfahren().await;

        Ok(())
    }
}
