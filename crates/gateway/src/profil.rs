//! Profilverwaltung hinter dem Gate
//!
//! [`ProfilService`] kapselt die Regeln (Seitenkorrektur, leere Namen,
//! Passwort-Hash entfernen), [`ProfilHandler`] das Gate vor jeder Methode
//! und die Pruefung, dass nur das eigene Profil geaendert oder geloescht
//! wird.

use std::{future::Future, sync::Arc, time::Duration};

use tonic::{Request, Response, Status};
use torwache_db::{
    models::{BenutzerFilter, BenutzerRecord, BenutzerUpdate},
    repository::{AuthRepository, UserRepository},
    DbError, DbResult,
};
use uuid::Uuid;

use crate::{
    error::{GatewayError, GatewayResult},
    gate::AnfrageGate,
    kontext::AuthKontextExt,
    nachrichten::{
        Benutzer, DeleteProfileRequest, DeleteProfileResponse, GetProfileRequest,
        GetProfileResponse, ListUsersRequest, ListUsersResponse, UpdateProfileRequest,
        UpdateProfileResponse,
    },
};

/// Standardanzahl Eintraege pro Seite
pub const STANDARD_LIMIT: u32 = 10;
/// Groesstes erlaubtes Limit, darueber gilt [`STANDARD_LIMIT`]
pub const MAX_LIMIT: u32 = 100;

/// Seiten unter 1 werden zu 1
pub fn seite_korrigieren(seite: i32) -> u32 {
    u32::try_from(seite).ok().filter(|&s| s >= 1).unwrap_or(1)
}

/// Limits ausserhalb von 1..=100 werden zu 10
pub fn limit_korrigieren(limit: i32) -> u32 {
    u32::try_from(limit)
        .ok()
        .filter(|l| (1..=MAX_LIMIT).contains(l))
        .unwrap_or(STANDARD_LIMIT)
}

/// Eine Seite der Benutzerliste
#[derive(Debug, Clone)]
pub struct BenutzerSeite {
    pub benutzer: Vec<BenutzerRecord>,
    pub gesamt: u64,
    pub seite: u32,
    pub limit: u32,
}

pub struct ProfilService<U: UserRepository> {
    user_repo: Arc<U>,
    zeitlimit: Duration,
}

impl<U: UserRepository> ProfilService<U> {
    pub fn neu(user_repo: Arc<U>, zeitlimit: Duration) -> Self {
        Self {
            user_repo,
            zeitlimit,
        }
    }

    pub async fn profil_laden(&self, id: Uuid) -> GatewayResult<BenutzerRecord> {
        self.speicher(self.user_repo.get_by_id(id))
            .await?
            .map(BenutzerRecord::ohne_passwort)
            .ok_or(GatewayError::NichtGefunden)
    }

    /// Aendert den Anzeigenamen; ein leerer Name laesst ihn unveraendert
    pub async fn profil_aktualisieren(
        &self,
        id: Uuid,
        name: &str,
    ) -> GatewayResult<BenutzerRecord> {
        let update = BenutzerUpdate {
            name: (!name.is_empty()).then(|| name.to_string()),
        };
        let benutzer = self.speicher(self.user_repo.update(id, update)).await?;

        tracing::info!(user_id = %id, "Profil aktualisiert");
        Ok(benutzer.ohne_passwort())
    }

    /// Markiert den Benutzer als geloescht
    pub async fn profil_loeschen(&self, id: Uuid) -> GatewayResult<()> {
        if !self.speicher(self.user_repo.soft_delete(id)).await? {
            return Err(GatewayError::NichtGefunden);
        }
        tracing::info!(user_id = %id, "Profil geloescht");
        Ok(())
    }

    pub async fn benutzer_auflisten(
        &self,
        seite: i32,
        limit: i32,
        name_filter: &str,
        email_filter: &str,
    ) -> GatewayResult<BenutzerSeite> {
        let seite = seite_korrigieren(seite);
        let limit = limit_korrigieren(limit);

        let filter = BenutzerFilter {
            seite,
            limit,
            name: Some(name_filter).filter(|s| !s.is_empty()),
            email: Some(email_filter).filter(|s| !s.is_empty()),
        };
        let (benutzer, gesamt) = self.speicher(self.user_repo.list(filter)).await?;

        Ok(BenutzerSeite {
            benutzer: benutzer.into_iter().map(BenutzerRecord::ohne_passwort).collect(),
            gesamt,
            seite,
            limit,
        })
    }

    async fn speicher<T>(&self, vorgang: impl Future<Output = DbResult<T>>) -> DbResult<T> {
        tokio::time::timeout(self.zeitlimit, vorgang)
            .await
            .unwrap_or(Err(DbError::Zeitlimit(self.zeitlimit)))
    }
}

// Vollstaendige Methodennamen fuer das Gate
const GET_PROFILE: &str = "/users.UserService/GetProfile";
const UPDATE_PROFILE: &str = "/users.UserService/UpdateProfile";
const DELETE_PROFILE: &str = "/users.UserService/DeleteProfile";
const LIST_USERS: &str = "/users.UserService/ListUsers";

/// Handler der User-Service-Methoden
///
/// Jede Methode laeuft zuerst durch das [`AnfrageGate`].
pub struct ProfilHandler<U: UserRepository, A: AuthRepository> {
    profile: Arc<ProfilService<U>>,
    gate: AnfrageGate<U, A>,
}

impl<U: UserRepository, A: AuthRepository> ProfilHandler<U, A> {
    pub fn neu(profile: Arc<ProfilService<U>>, gate: AnfrageGate<U, A>) -> Self {
        Self { profile, gate }
    }

    /// Laedt das angefragte Profil, ohne ID das eigene
    pub async fn get_profile(
        &self,
        request: Request<GetProfileRequest>,
    ) -> Result<Response<GetProfileResponse>, Status> {
        let request = self.gate.pruefen(GET_PROFILE, request).await?;

        let id = if request.get_ref().user_id.is_empty() {
            request
                .auth_kontext()
                .map(|k| k.user_id())
                .ok_or(GatewayError::NichtAngemeldet)?
        } else {
            id_parsen(&request.get_ref().user_id)?
        };

        let benutzer = self.profile.profil_laden(id).await?;
        Ok(Response::new(GetProfileResponse {
            user: Some(Benutzer::from(&benutzer)),
        }))
    }

    pub async fn update_profile(
        &self,
        request: Request<UpdateProfileRequest>,
    ) -> Result<Response<UpdateProfileResponse>, Status> {
        let request = self.gate.pruefen(UPDATE_PROFILE, request).await?;
        let id = eigene_id(
            &request,
            &request.get_ref().user_id,
            "Nur das eigene Profil kann geaendert werden",
        )?;

        let benutzer = self
            .profile
            .profil_aktualisieren(id, &request.get_ref().name)
            .await?;

        Ok(Response::new(UpdateProfileResponse {
            success: true,
            message: "Profil erfolgreich aktualisiert".into(),
            user: Some(Benutzer::from(&benutzer)),
        }))
    }

    pub async fn delete_profile(
        &self,
        request: Request<DeleteProfileRequest>,
    ) -> Result<Response<DeleteProfileResponse>, Status> {
        let request = self.gate.pruefen(DELETE_PROFILE, request).await?;
        let id = eigene_id(
            &request,
            &request.get_ref().user_id,
            "Nur das eigene Profil kann geloescht werden",
        )?;

        self.profile.profil_loeschen(id).await?;

        Ok(Response::new(DeleteProfileResponse {
            success: true,
            message: "Profil erfolgreich geloescht".into(),
        }))
    }

    pub async fn list_users(
        &self,
        request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let body = self.gate.pruefen(LIST_USERS, request).await?.into_inner();
        let seite = self
            .profile
            .benutzer_auflisten(body.page, body.limit, &body.name_filter, &body.email_filter)
            .await?;

        Ok(Response::new(ListUsersResponse {
            users: seite.benutzer.iter().map(Benutzer::from).collect(),
            total: i64::try_from(seite.gesamt).unwrap_or(i64::MAX),
            page: i32::try_from(seite.seite).unwrap_or(i32::MAX),
            limit: i32::try_from(seite.limit).unwrap_or(i32::MAX),
        }))
    }
}

fn id_parsen(wert: &str) -> GatewayResult<Uuid> {
    Uuid::parse_str(wert)
        .map_err(|_| GatewayError::UngueltigeEingabe("Ungueltige user_id".into()))
}

/// ID des Aufrufers; eine abweichende angefragte ID wird abgelehnt
fn eigene_id<T>(request: &Request<T>, angefragt: &str, meldung: &str) -> GatewayResult<Uuid> {
    let eigene = request
        .auth_kontext()
        .map(|k| k.user_id())
        .ok_or(GatewayError::NichtAngemeldet)?;

    if !angefragt.is_empty() && Uuid::parse_str(angefragt).ok() != Some(eigene) {
        return Err(GatewayError::KeineBerechtigung(meldung.into()));
    }
    Ok(eigene)
}
