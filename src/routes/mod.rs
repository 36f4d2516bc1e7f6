// Route exports
pub mod parcels;

use actix_web::web;

pub use parcels::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(parcels::configure),
    );
}
