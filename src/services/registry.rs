use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BuildingFilter, Candidate, ParcelCandidate, ParcelQuery};

/// Errors raised by a cadastral registry backend
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("SQLx error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the cadastral registry
///
/// The matcher only goes through this trait, so the PostGIS store and the
/// in-memory store are interchangeable.
#[async_trait]
pub trait ParcelRegistry: Send + Sync {
    /// Parcels whose area lies in `query.area_band` (inclusive) and whose
    /// cadastral-municipality name contains `query.settlement_token`,
    /// case-insensitively.
    async fn find_parcels(&self, query: &ParcelQuery) -> Result<Vec<ParcelCandidate>, RegistryError>;

    /// Inner join of `parcels` with their building records, keeping only
    /// buildings accepted by `filter`. Parcels without a building are dropped;
    /// a parcel with several matching buildings yields one pair per building.
    async fn join_buildings(
        &self,
        parcels: &[ParcelCandidate],
        filter: &BuildingFilter,
    ) -> Result<Vec<Candidate>, RegistryError>;

    async fn health_check(&self) -> Result<bool, RegistryError>;
}
