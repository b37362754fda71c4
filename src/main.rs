use std::net::TcpListener;

use anyhow::Context;

use sqlx::PgPool;

use ctms::settings::Settings;
use ctms::{app, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info", std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load().expect("Failed to load settings");

    let pool = PgPool::connect_with(settings.database.with_db()).await?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let listener = TcpListener::bind(settings.app.addr())?;

    app::run(listener, pool)?.await.context("Failed to run app")
}
