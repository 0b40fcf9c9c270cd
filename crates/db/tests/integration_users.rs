//! Integration-Tests fuer UserRepository (In-Memory SQLite)

use torwache_db::{
    models::{BenutzerFilter, BenutzerUpdate, NeuerBenutzer},
    DbError, SqliteDb, UserRepository,
};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

fn neuer<'a>(email: &'a str, name: &'a str) -> NeuerBenutzer<'a> {
    NeuerBenutzer {
        email,
        password_hash: "hash",
        name,
    }
}

#[tokio::test]
async fn benutzer_erstellen_und_laden() {
    let db = db().await;

    let user = UserRepository::create(&db, neuer("alice@example.com", "Alice"))
        .await
        .expect("Benutzer erstellen fehlgeschlagen");

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.name, "Alice");
    assert!(user.deleted_at.is_none());

    let geladen = UserRepository::get_by_id(&db, user.id)
        .await
        .expect("get_by_id fehlgeschlagen")
        .expect("Benutzer sollte gefunden werden");

    assert_eq!(geladen.id, user.id);
    assert_eq!(geladen.password_hash, "hash");
}

#[tokio::test]
async fn benutzer_nach_email_laden() {
    let db = db().await;

    UserRepository::create(&db, neuer("bob@example.com", "Bob"))
        .await
        .unwrap();

    let gefunden = UserRepository::get_by_email(&db, "bob@example.com")
        .await
        .unwrap()
        .expect("Benutzer 'bob' sollte gefunden werden");
    assert_eq!(gefunden.name, "Bob");

    let nicht_gefunden = UserRepository::get_by_email(&db, "unbekannt@example.com")
        .await
        .unwrap();
    assert!(nicht_gefunden.is_none());
}

#[tokio::test]
async fn email_ist_eindeutig() {
    let db = db().await;

    UserRepository::create(&db, neuer("charlie@example.com", "Charlie"))
        .await
        .unwrap();

    let err = UserRepository::create(&db, neuer("charlie@example.com", "Charlie 2"))
        .await
        .expect_err("Doppelte E-Mail muss fehlschlagen");
    assert!(matches!(err, DbError::Eindeutigkeit(_)));
    assert!(err.ist_eindeutigkeit());
}

#[tokio::test]
async fn name_aktualisieren() {
    let db = db().await;
    let user = UserRepository::create(&db, neuer("dora@example.com", "Dora"))
        .await
        .unwrap();

    let aktualisiert = UserRepository::update(
        &db,
        user.id,
        BenutzerUpdate {
            name: Some("Dora Explorer".into()),
        },
    )
    .await
    .unwrap();

    assert_eq!(aktualisiert.name, "Dora Explorer");
    assert_eq!(aktualisiert.email, "dora@example.com");
    assert!(aktualisiert.updated_at >= user.updated_at);

    // Leeres Update liefert den unveraenderten Datensatz
    let unveraendert = UserRepository::update(&db, user.id, BenutzerUpdate::default())
        .await
        .unwrap();
    assert_eq!(unveraendert.name, "Dora Explorer");
}

#[tokio::test]
async fn update_unbekannter_benutzer() {
    let db = db().await;
    let err = UserRepository::update(
        &db,
        uuid::Uuid::new_v4(),
        BenutzerUpdate {
            name: Some("Niemand".into()),
        },
    )
    .await
    .expect_err("Update auf unbekannten Benutzer muss fehlschlagen");
    assert!(matches!(err, DbError::NichtGefunden(_)));
}

#[tokio::test]
async fn weich_geloeschte_benutzer_sind_unsichtbar() {
    let db = db().await;
    let user = UserRepository::create(&db, neuer("emil@example.com", "Emil"))
        .await
        .unwrap();

    assert!(UserRepository::soft_delete(&db, user.id).await.unwrap());
    // Zweites Loeschen betrifft keinen aktiven Benutzer mehr
    assert!(!UserRepository::soft_delete(&db, user.id).await.unwrap());

    assert!(UserRepository::get_by_id(&db, user.id).await.unwrap().is_none());
    assert!(UserRepository::get_by_email(&db, "emil@example.com")
        .await
        .unwrap()
        .is_none());

    let (liste, gesamt) = UserRepository::list(&db, BenutzerFilter::default())
        .await
        .unwrap();
    assert!(liste.is_empty());
    assert_eq!(gesamt, 0);
}

#[tokio::test]
async fn hartes_loeschen() {
    let db = db().await;
    let user = UserRepository::create(&db, neuer("frida@example.com", "Frida"))
        .await
        .unwrap();

    assert!(UserRepository::delete(&db, user.id).await.unwrap());
    assert!(!UserRepository::delete(&db, user.id).await.unwrap());

    // Nach hartem Loeschen ist die E-Mail wieder frei
    UserRepository::create(&db, neuer("frida@example.com", "Frida"))
        .await
        .expect("E-Mail sollte wieder verfuegbar sein");
}

#[tokio::test]
async fn liste_mit_filter_und_paginierung() {
    let db = db().await;
    for (email, name) in [
        ("anna@example.com", "Anna"),
        ("annika@example.org", "Annika"),
        ("bert@example.com", "Bert"),
        ("carla@example.net", "Carla"),
    ] {
        UserRepository::create(&db, neuer(email, name)).await.unwrap();
    }

    let (alle, gesamt) = UserRepository::list(
        &db,
        BenutzerFilter {
            limit: 100,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(gesamt, 4);
    assert_eq!(alle.len(), 4);
    // Neueste zuerst
    assert_eq!(alle[0].name, "Carla");

    let (ann, gesamt) = UserRepository::list(
        &db,
        BenutzerFilter {
            name: Some("ANN"),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(gesamt, 2);
    assert!(ann.iter().all(|u| u.name.starts_with("Ann")));

    let (com, gesamt) = UserRepository::list(
        &db,
        BenutzerFilter {
            email: Some(".com"),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(gesamt, 2);
    assert_eq!(com.len(), 2);

    let (seite2, gesamt) = UserRepository::list(
        &db,
        BenutzerFilter {
            seite: 2,
            limit: 3,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(gesamt, 4);
    assert_eq!(seite2.len(), 1);
    assert_eq!(seite2[0].name, "Anna");
}
