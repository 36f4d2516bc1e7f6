use async_trait::async_trait;

use crate::models::{BuildingCandidate, BuildingFilter, Candidate, ParcelCandidate, ParcelQuery};
use crate::services::registry::{ParcelRegistry, RegistryError};

/// Registry over parcel and building records held in memory
///
/// Applies the same filters as the PostGIS store. Used for tests, benches and
/// fixtures loaded from JSON.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    parcels: Vec<ParcelCandidate>,
    buildings: Vec<BuildingCandidate>,
}

impl InMemoryRegistry {
    pub fn new(parcels: Vec<ParcelCandidate>, buildings: Vec<BuildingCandidate>) -> Self {
        Self { parcels, buildings }
    }

    pub fn add_parcel(&mut self, parcel: ParcelCandidate) -> &mut Self {
        self.parcels.push(parcel);
        self
    }

    pub fn add_building(&mut self, building: BuildingCandidate) -> &mut Self {
        self.buildings.push(building);
        self
    }

    pub fn parcel_count(&self) -> usize {
        self.parcels.len()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }
}

#[async_trait]
impl ParcelRegistry for InMemoryRegistry {
    async fn find_parcels(&self, query: &ParcelQuery) -> Result<Vec<ParcelCandidate>, RegistryError> {
        let parcels: Vec<ParcelCandidate> = self
            .parcels
            .iter()
            .filter(|parcel| query.area_band.contains(parcel.area_m2))
            .filter(|parcel| {
                parcel
                    .cadastral_municipality_name
                    .to_lowercase()
                    .contains(&query.settlement_token)
            })
            .cloned()
            .collect();

        tracing::trace!("In-memory registry matched {} parcels", parcels.len());

        Ok(parcels)
    }

    async fn join_buildings(
        &self,
        parcels: &[ParcelCandidate],
        filter: &BuildingFilter,
    ) -> Result<Vec<Candidate>, RegistryError> {
        let mut pairs = Vec::new();

        for parcel in parcels {
            let buildings = self
                .buildings
                .iter()
                .filter(|building| building.parcel_id == parcel.id && filter.accepts(building));

            for building in buildings {
                pairs.push(Candidate::with_building(parcel.clone(), building.clone()));
            }
        }

        Ok(pairs)
    }

    async fn health_check(&self) -> Result<bool, RegistryError> {
        Ok(true)
    }
}
