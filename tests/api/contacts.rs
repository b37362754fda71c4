use reqwest::StatusCode;

use serde_json::json;

use sqlx::PgPool;

use uuid::Uuid;

use ctms::model::{AmoAccount, FxaAccount, VpnWaitlist};

use crate::helpers::TestApp;

const EXAMPLE_EMAIL_ID: &str = "332de237-cab7-4461-bcc3-48e68f42bd5c";

fn minimal_contact_payload() -> serde_json::Value {
    json!({
        "email": {
            "email_id": EXAMPLE_EMAIL_ID,
            "primary_email": "contact@example.com"
        },
        "newsletters": ["app-dev", "maker-party"]
    })
}

fn maximal_contact_payload() -> serde_json::Value {
    json!({
        "email": {
            "email_id": "67e52c77-950f-4f28-accb-bb3ea1a2c51a",
            "primary_email": "mozilla-fan@example.com",
            "basket_token": "d9ba6182-f5dd-4728-a477-2cc11bf62b69",
            "sfdc_id": "001A000001aMozFan",
            "first_name": "Fan",
            "last_name": "of Mozilla",
            "mailing_country": "ca",
            "email_lang": "fr"
        },
        "amo": {
            "display_name": "#1 Mozilla Fan",
            "email_opt_in": true,
            "user": true,
            "user_id": "98765",
            "username": "Mozilla1Fan"
        },
        "fxa": {
            "fxa_id": "611b6788-2bba-42a6-98c9-9ce6eb9cbd34",
            "primary_email": "fxa-firefox-fan@example.com",
            "first_service": "monitor"
        },
        "vpn_waitlist": {
            "geo": "ca",
            "platform": "windows,android"
        },
        "newsletters": ["ambassadors", "common-voice"]
    })
}

#[sqlx::test]
async fn create_then_read_returns_the_basket_format(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .contact_create(&minimal_contact_payload())
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let res = app
        .contact_read(EXAMPLE_EMAIL_ID)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");

    // Absent sub-entities come back as their all-default shapes, never null
    assert_eq!(serde_json::to_value(AmoAccount::default()).unwrap(), body["amo"]);
    assert_eq!(serde_json::to_value(FxaAccount::default()).unwrap(), body["fxa"]);
    assert_eq!(
        serde_json::to_value(VpnWaitlist::default()).unwrap(),
        body["vpn_waitlist"]
    );

    assert_eq!(json!(["app-dev", "maker-party"]), body["newsletters"]);
    assert_eq!("ok", body["status"]);

    assert_eq!(EXAMPLE_EMAIL_ID, body["email"]["email_id"]);
    assert_eq!("contact@example.com", body["email"]["primary_email"]);
    assert_eq!("H", body["email"]["email_format"]);
    assert_eq!("en", body["email"]["email_lang"]);

    Ok(())
}

#[sqlx::test]
async fn create_returns_the_created_contact(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .contact_create(&maximal_contact_payload())
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");

    assert_eq!("ok", body["status"]);
    assert_eq!("#1 Mozilla Fan", body["amo"]["display_name"]);
    assert_eq!("98765", body["amo"]["user_id"]);
    assert_eq!("611b6788-2bba-42a6-98c9-9ce6eb9cbd34", body["fxa"]["fxa_id"]);
    assert_eq!("windows,android", body["vpn_waitlist"]["platform"]);
    assert_eq!(json!(["ambassadors", "common-voice"]), body["newsletters"]);

    Ok(())
}

#[sqlx::test]
async fn read_unknown_contact_returns_not_found(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .contact_read(&Uuid::new_v4().to_string())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!(json!({ "detail": "Unknown contact_id" }), body);

    Ok(())
}

#[sqlx::test]
async fn create_with_malformed_email_returns_bad_request(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let payload = json!({
        "email": {
            "primary_email": "not an email address"
        }
    });

    let res = app
        .contact_create(&payload)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    Ok(())
}

#[sqlx::test]
async fn create_duplicate_contact_returns_conflict(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .contact_create(&minimal_contact_payload())
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let res = app
        .contact_create(&minimal_contact_payload())
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CONFLICT, res.status());

    Ok(())
}

#[sqlx::test]
async fn find_by_amo_user_id_returns_matching_contacts(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    for payload in [minimal_contact_payload(), maximal_contact_payload()] {
        let res = app
            .contact_create(&payload)
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::CREATED, res.status());
    }

    let res = app
        .contact_find(&[("amo_user_id", "98765")])
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    let matches = body.as_array().expect("Expected a JSON array");

    assert_eq!(1, matches.len());
    assert_eq!(
        "67e52c77-950f-4f28-accb-bb3ea1a2c51a",
        matches[0]["email"]["email_id"]
    );
    assert_eq!("ok", matches[0]["status"]);

    Ok(())
}

#[sqlx::test]
async fn find_without_criteria_returns_bad_request(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .contact_find(&[])
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!(
        json!({ "detail": "at least one contact identifier is required" }),
        body
    );

    Ok(())
}

#[sqlx::test]
async fn identity_returns_the_identifier_keys(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .contact_create(&maximal_contact_payload())
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let res = app
        .identity_read("67e52c77-950f-4f28-accb-bb3ea1a2c51a")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!(
        json!({
            "email_id": "67e52c77-950f-4f28-accb-bb3ea1a2c51a",
            "basket_token": "d9ba6182-f5dd-4728-a477-2cc11bf62b69",
            "amo_user_id": "98765",
            "fxa_id": "611b6788-2bba-42a6-98c9-9ce6eb9cbd34",
            "fxa_primary_email": "fxa-firefox-fan@example.com"
        }),
        body
    );

    Ok(())
}

#[sqlx::test]
async fn identity_of_unknown_contact_returns_not_found(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .identity_read(&Uuid::new_v4().to_string())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());

    Ok(())
}

#[sqlx::test]
async fn create_is_atomic_when_a_sub_entity_violates_a_constraint(
    pool: PgPool,
) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let mut payload = maximal_contact_payload();
    // Overflows the varchar(10) location column
    payload["amo"]["location"] = json!("a".repeat(24));

    let res = app
        .contact_create(&payload)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    // Nothing of the contact may survive the failed create
    let res = app
        .contact_read("67e52c77-950f-4f28-accb-bb3ea1a2c51a")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    Ok(())
}
