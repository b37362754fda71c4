use sqlx::PgPool;

use crate::helpers::TestApp;

#[sqlx::test]
async fn health_returns_the_liveness_payload(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app.health_check().await.expect("Failed to execute request");

    assert!(res.status().is_success());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!(serde_json::json!({ "health": "OK" }), body);

    Ok(())
}

#[sqlx::test]
async fn root_redirects_to_the_docs(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client");

    let res = client
        .get(app.url(""))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(reqwest::StatusCode::TEMPORARY_REDIRECT, res.status());
    assert_eq!(
        "./docs",
        res.headers()
            .get(reqwest::header::LOCATION)
            .expect("Missing location header")
    );

    Ok(())
}
