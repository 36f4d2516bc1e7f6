//! Parcel Detective - fuzzy matching of real-estate listings to cadastral parcels
//!
//! Given a listing (settlement, parcel area and optional building hints) the
//! library retrieves tolerance-bounded candidates from a parcel registry,
//! scores them, keeps the most probable ones and projects them into plain
//! records plus a GeoJSON feature collection.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::config::Settings;
pub use crate::core::{rank, score_all, score_one, settlement_token, Matcher};
pub use crate::error::MatchError;
pub use crate::models::{FindParcelsResponse, ListingQuery, MatchScore, MatchStatus};
pub use crate::services::{InMemoryRegistry, ParcelRegistry, PostgisRegistry, RegistryError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::default();
        assert_eq!(matcher.scoring_config().max_possible_score(), 150);
        assert_eq!(settlement_token("Maribor - Tabor"), "maribor");
    }
}
