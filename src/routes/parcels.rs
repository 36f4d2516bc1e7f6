use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::Matcher;
use crate::error::MatchError;
use crate::models::{ErrorResponse, HealthResponse, ListingQuery};
use crate::services::ParcelRegistry;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn ParcelRegistry>,
    pub matcher: Matcher,
}

/// Configure all parcel-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/parcels/find-probable", web::post().to(find_probable));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let registry_healthy = state.registry.health_check().await.unwrap_or(false);

    let status = if registry_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find probable parcels endpoint
///
/// POST /api/v1/parcels/find-probable
///
/// Request body:
/// ```json
/// {
///   "settlement": "Ljubljana - Center",
///   "parcel_area_m2": 542.0,
///   "construction_year": 1974,
///   "net_floor_area_m2": 185.4,
///   "property_type": "Hiša",
///   "street_name": "Slovenska cesta"
/// }
/// ```
async fn find_probable(
    state: web::Data<AppState>,
    req: web::Json<ListingQuery>,
) -> impl Responder {
    let listing = req.into_inner();

    tracing::info!(
        "Finding parcels for settlement '{}', area {} m²",
        listing.settlement,
        listing.parcel_area_m2
    );

    match state
        .matcher
        .find_probable_matches(&listing, state.registry.as_ref())
        .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &MatchError) -> HttpResponse {
    let status = status_for(error);

    HttpResponse::build(status).json(ErrorResponse {
        error: error.kind().to_string(),
        message: error.to_string(),
        status_code: status.as_u16(),
    })
}

fn status_for(error: &MatchError) -> StatusCode {
    match error {
        MatchError::Validation(_) => StatusCode::BAD_REQUEST,
        MatchError::Registry(_) => StatusCode::BAD_GATEWAY,
        MatchError::RegistryTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}
