use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use parcel_detective::config::{LoggingSettings, Settings};
use parcel_detective::models::ErrorResponse;
use parcel_detective::routes::{self, AppState};
use parcel_detective::{Matcher, PostgisRegistry};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    info!("JSON payload error on {}: {}", req.path(), err);

    let response = HttpResponse::BadRequest().json(ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    });

    error::InternalError::from_response(err, response).into()
}

/// Initialize tracing; `LOG_LEVEL` / `LOG_FORMAT` override the configured values
fn init_tracing(logging: &LoggingSettings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();
    let logging = loaded
        .as_ref()
        .map(|settings| settings.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting parcel matching service...");

    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    info!(
        "Configuration loaded (parcel tolerance {}, year tolerance {}, max results {}, min confidence {}%)",
        settings.matching.parcel_area_tolerance,
        settings.matching.construction_year_tolerance,
        settings.matching.max_results,
        settings.matching.min_confidence
    );

    let registry = match PostgisRegistry::from_settings(&settings.database).await {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to connect to cadastral registry: {}", e);
            return Err(std::io::Error::other(format!("Registry connection error: {}", e)));
        }
    };

    info!("Cadastral registry connected");

    let matcher = Matcher::from_settings(&settings);

    info!("Matcher initialized with scoring: {:?}", settings.scoring);

    let app_state = AppState { registry, matcher };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
