use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::header;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use serde_json::json;

use sqlx::PgPool;

use tracing_actix_web::TracingLogger;

use crate::controller::contacts;

/// Liveness probe: reports process availability only, no dependency checks
#[tracing::instrument(name = "Health check")]
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "health": "OK" }))
}

/// GET via root redirects to the API docs
#[get("/")]
async fn root() -> impl Responder {
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, "./docs"))
        .finish()
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, pool: PgPool) -> anyhow::Result<Server> {
    // Wrap application data
    let pool = web::Data::new(pool);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(pool.clone())
            .service(health)
            .service(root)
            .service(contacts::ctms_scope())
            .service(contacts::identity_scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
