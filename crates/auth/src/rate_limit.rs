//! Rate Limiter fuer Login-Versuche
//!
//! Zaehlt Versuche pro Schluessel (E-Mail) in einem festen Zeitfenster.
//! Rein im Speicher, geht bei Neustart verloren und wird nicht zwischen
//! mehreren Instanzen geteilt.
//!
//! Die Map liegt in einer `DashMap`: Zugriffe auf denselben Schluessel
//! sind linearisiert, verschiedene Schluessel konkurrieren nur innerhalb
//! eines Shards. Ein Hintergrund-Task entfernt abgelaufene Fenster; fuer
//! die Korrektheit von [`RateLimiter::erlauben`] ist er nicht noetig.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use dashmap::DashMap;
use tokio::{sync::watch, time::Instant};

/// Konfiguration des Rate Limiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitKonfig {
    /// Erlaubte Versuche pro Fenster
    pub max_versuche: u32,
    /// Laenge des Zeitfensters
    pub fenster: Duration,
}

impl Default for RateLimitKonfig {
    fn default() -> Self {
        Self {
            max_versuche: 5,
            fenster: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Fenster {
    anzahl: u32,
    beginn: Instant,
}

/// Nebenlaeufigkeitssicherer Zaehler mit periodischer Bereinigung
#[derive(Debug)]
pub struct RateLimiter {
    konfig: RateLimitKonfig,
    eintraege: DashMap<String, Fenster>,
    shutdown_tx: watch::Sender<bool>,
}

impl RateLimiter {
    /// Erstellt den Limiter und startet den Bereinigungs-Task
    ///
    /// Muss innerhalb einer Tokio-Runtime aufgerufen werden. Der Task
    /// endet mit [`RateLimiter::beenden`] oder sobald der Limiter
    /// gedroppt wurde.
    pub fn neu(konfig: RateLimitKonfig) -> Arc<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let limiter = Arc::new(Self {
            konfig,
            eintraege: DashMap::new(),
            shutdown_tx,
        });

        tokio::spawn(Self::bereinigung_starten(
            Arc::downgrade(&limiter),
            konfig.fenster,
            shutdown_rx,
        ));

        limiter
    }

    async fn bereinigung_starten(
        limiter: Weak<Self>,
        periode: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut takt = tokio::time::interval_at(Instant::now() + periode, periode);

        loop {
            tokio::select! {
                _ = takt.tick() => {
                    let Some(limiter) = limiter.upgrade() else { break };
                    let entfernt = limiter.bereinigen();
                    if entfernt > 0 {
                        tracing::debug!(
                            anzahl = entfernt,
                            "Abgelaufene Rate-Limit-Fenster bereinigt"
                        );
                    }
                }
                ergebnis = shutdown_rx.changed() => {
                    if ergebnis.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Rate-Limit-Bereinigung beendet");
    }

    /// Prueft und zaehlt einen Versuch fuer `schluessel`
    ///
    /// Ein Fenster gilt erst als abgelaufen, wenn seit Beginn mehr als
    /// `fenster` vergangen ist. Genau an der Grenze wird noch gezaehlt.
    pub fn erlauben(&self, schluessel: &str) -> bool {
        let jetzt = Instant::now();

        if let Some(mut eintrag) = self.eintraege.get_mut(schluessel) {
            if jetzt.duration_since(eintrag.beginn) > self.konfig.fenster {
                *eintrag = Fenster {
                    anzahl: 1,
                    beginn: jetzt,
                };
                return true;
            }
            if eintrag.anzahl >= self.konfig.max_versuche {
                return false;
            }
            eintrag.anzahl += 1;
            return true;
        }

        // Zwischen get_mut und entry kann ein anderer Aufrufer den
        // Schluessel angelegt haben
        let mut eintrag = self
            .eintraege
            .entry(schluessel.to_string())
            .or_insert(Fenster {
                anzahl: 0,
                beginn: jetzt,
            });
        if eintrag.anzahl >= self.konfig.max_versuche {
            return false;
        }
        eintrag.anzahl += 1;
        true
    }

    /// Entfernt alle Fenster, die aelter als die Fensterlaenge sind
    fn bereinigen(&self) -> usize {
        let jetzt = Instant::now();
        let vorher = self.eintraege.len();
        self.eintraege
            .retain(|_, f| jetzt.duration_since(f.beginn) <= self.konfig.fenster);
        vorher.saturating_sub(self.eintraege.len())
    }

    /// Stoppt den Bereinigungs-Task
    pub fn beenden(&self) {
        // Fehler nur wenn der Task bereits beendet ist
        let _ = self.shutdown_tx.send(true);
    }

    /// Anzahl aktuell gehaltener Schluessel
    pub fn anzahl_schluessel(&self) -> usize {
        self.eintraege.len()
    }
}
