use tracing::{debug, error};

use crate::config::MatchingConfig;
use crate::core::tolerance::settlement_token;
use crate::error::MatchError;
use crate::models::{BuildingFilter, Candidate, ListingQuery, ParcelQuery};
use crate::services::{ParcelRegistry, RegistryError};

/// Retrieves tolerance-bounded candidates from the registry
///
/// # Retrieval stages
/// 1. Parcel-area band and settlement token lookup
/// 2. Inner join to buildings when the listing carries a year or floor area
///
/// The whole registry interaction is bounded by the configured timeout and
/// is never retried.
#[derive(Debug, Clone)]
pub struct CandidateFinder {
    config: MatchingConfig,
}

impl CandidateFinder {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Parcel lookup for a listing
    pub fn parcel_query(&self, listing: &ListingQuery) -> ParcelQuery {
        ParcelQuery {
            area_band: self.config.parcel_area_band(listing.parcel_area_m2),
            settlement_token: settlement_token(&listing.settlement),
        }
    }

    /// Building constraints implied by the listing's hints
    pub fn building_filter(&self, listing: &ListingQuery) -> BuildingFilter {
        BuildingFilter {
            year_band: listing
                .construction_year
                .map(|year| self.config.year_band(year)),
            floor_area_band: listing
                .net_floor_area_m2
                .map(|area| self.config.building_area_band(area)),
        }
    }

    /// Find candidates for an already validated listing
    ///
    /// An empty band, an unknown settlement or a join that excludes every
    /// parcel all yield an empty list; only registry failures are errors.
    pub async fn find(
        &self,
        listing: &ListingQuery,
        registry: &dyn ParcelRegistry,
    ) -> Result<Vec<Candidate>, MatchError> {
        let timeout = self.config.registry_timeout();

        match tokio::time::timeout(timeout, self.query_registry(listing, registry)).await {
            Ok(Ok(candidates)) => Ok(candidates),
            Ok(Err(e)) => {
                error!("Registry query failed: {}", e);
                Err(MatchError::Registry(e))
            }
            Err(_) => {
                error!("Registry query timed out after {:?}", timeout);
                Err(MatchError::RegistryTimeout(timeout))
            }
        }
    }

    async fn query_registry(
        &self,
        listing: &ListingQuery,
        registry: &dyn ParcelRegistry,
    ) -> Result<Vec<Candidate>, RegistryError> {
        let query = self.parcel_query(listing);

        if query.area_band.is_empty() || query.settlement_token.is_empty() {
            debug!("Empty parcel query ({:?}), skipping registry", query);
            return Ok(Vec::new());
        }

        debug!(
            "Parcel query: area [{:.2}, {:.2}] m², settlement token '{}'",
            query.area_band.min, query.area_band.max, query.settlement_token
        );

        let parcels = registry.find_parcels(&query).await?;

        debug!("Registry returned {} parcels", parcels.len());

        if !listing.has_building_hints() {
            return Ok(parcels.into_iter().map(Candidate::parcel_only).collect());
        }

        if parcels.is_empty() {
            return Ok(Vec::new());
        }

        let filter = self.building_filter(listing);
        let candidates = registry.join_buildings(&parcels, &filter).await?;

        debug!(
            "Building join kept {} candidates from {} parcels ({:?})",
            candidates.len(),
            parcels.len(),
            filter
        );

        Ok(candidates)
    }
}
