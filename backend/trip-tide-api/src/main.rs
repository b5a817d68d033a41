use actix_web::{web, App, HttpServer};
use anyhow::Context;
use crypto_core::JwtKeys;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

use trip_tide_api::config::Config;
use trip_tide_api::middleware::JwtMiddleware;
use trip_tide_api::schema::build_schema;
use trip_tide_api::services::Services;
use trip_tide_api::{init_tracing, open_store, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,trip_tide_api=debug");

    info!("Starting Trip Tide API...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let keys = Arc::new(JwtKeys::from_secret(
        &config.jwt.secret,
        config.jwt.issuer.clone(),
        config.jwt.expiry_seconds,
    ));
    info!(
        issuer = %config.jwt.issuer,
        expiry_seconds = config.jwt.expiry_seconds,
        "JWT configuration loaded"
    );

    let store = open_store(&config).await?;
    let services = Services::new(store.clone(), keys.clone());
    let schema = build_schema(services, store.clone(), &config.graphql);

    let (host, port) = config.bind_address();
    let workers = config.server.workers;
    let cors_origins = config.server.cors_allowed_origins.clone();
    let graphql_config = config.graphql.clone();

    info!(
        host = %host,
        port,
        workers,
        playground = graphql_config.playground,
        "Trip Tide API listening"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(JwtMiddleware::new(keys.clone()))
            .wrap(routes::cors(&cors_origins))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(graphql_config.clone()))
            .configure(routes::configure)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await?;

    info!("Trip Tide API stopped");
    Ok(())
}
