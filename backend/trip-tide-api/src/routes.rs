//! HTTP surface: GraphQL endpoint, SDL, playground and health check

use actix_cors::Cors;
use actix_web::{http::header, web, HttpMessage, HttpRequest, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use crypto_core::Claims;
use error_types::{ErrorResponse, ServiceError};
use serde_json::json;
use tracing::error;

use crate::config::GraphQLConfig;
use crate::schema::AppSchema;
use crate::store::Store;

const GRAPHQL_PATH: &str = "/graphql";

async fn graphql_handler(
    schema: web::Data<AppSchema>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    let claims = http_req.extensions().get::<Claims>().cloned();
    if let Some(claims) = claims {
        request = request.data(claims);
    }
    schema.execute(request).await.into()
}

/// SDL endpoint for client code generation
async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(schema.sdl())
}

async fn playground_handler(config: web::Data<GraphQLConfig>) -> HttpResponse {
    if !config.playground {
        let body = ErrorResponse::from(&ServiceError::not_found("Playground", "/playground"));
        return HttpResponse::NotFound().json(body);
    }

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

async fn health_handler(store: web::Data<Store>) -> HttpResponse {
    let backend = store.health.backend();
    match store.health.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok", "store": backend })),
        Err(e) => {
            error!(error = %e, store = backend, "Health check failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_types::error_codes::INTERNAL_SERVER_ERROR,
                "Store unavailable",
                503,
            ))
        }
    }
}

/// Register every route; expects `AppSchema`, `Store` and `GraphQLConfig` app data
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(GRAPHQL_PATH, web::post().to(graphql_handler))
        .route("/graphql/schema", web::get().to(schema_handler))
        .route("/playground", web::get().to(playground_handler))
        .route("/health", web::get().to(health_handler));
}

/// CORS policy for the browser client; no configured origins allows any
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
