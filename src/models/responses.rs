use serde::{Deserialize, Serialize};
use crate::models::domain::{BuildingCandidate, Geometry, ParcelCandidate, ScoreBreakdown};

/// Parcel attributes in the plain result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelRecord {
    pub id: i64,
    pub parcel_number: String,
    pub cadastral_municipality_code: String,
    pub cadastral_municipality_name: String,
    pub area_m2: f64,
}

impl From<&ParcelCandidate> for ParcelRecord {
    fn from(parcel: &ParcelCandidate) -> Self {
        Self {
            id: parcel.id,
            parcel_number: parcel.parcel_number.clone(),
            cadastral_municipality_code: parcel.cadastral_municipality_code.clone(),
            cadastral_municipality_name: parcel.cadastral_municipality_name.clone(),
            area_m2: parcel.area_m2,
        }
    }
}

/// Building attributes in the plain result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: i64,
    pub parcel_id: i64,
    pub building_number: Option<String>,
    pub construction_year: Option<i32>,
    pub net_floor_area_m2: Option<f64>,
    pub story_count: Option<i32>,
    pub type_label: Option<String>,
    pub address: Option<String>,
}

impl From<&BuildingCandidate> for BuildingRecord {
    fn from(building: &BuildingCandidate) -> Self {
        Self {
            id: building.id,
            parcel_id: building.parcel_id,
            building_number: building.building_number.clone(),
            construction_year: building.construction_year,
            net_floor_area_m2: building.net_floor_area_m2,
            story_count: building.story_count,
            type_label: building.type_label.clone(),
            address: building.address.full_address(),
        }
    }
}

/// One ranked match in the plain result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub parcel: ParcelRecord,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub building: Option<BuildingRecord>,
    /// Rounded to 2 decimals
    pub confidence: f64,
    pub score: u32,
    pub score_breakdown: ScoreBreakdown,
}

/// Presentation tier derived from confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

/// Properties attached to each parcel feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub parcel_id: i64,
    pub parcel_number: String,
    pub cadastral_municipality_code: String,
    pub cadastral_municipality_name: String,
    pub rank: usize,
    pub confidence: f64,
    pub score: u32,
    pub score_breakdown: ScoreBreakdown,
    pub area_m2: f64,
    pub tier: ConfidenceTier,
    pub color: String,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub building_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub construction_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub net_floor_area_m2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub building_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    #[default]
    FeatureCollection,
}

/// GeoJSON feature carrying a matched parcel's geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

/// GeoJSON feature collection of ranked parcels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Outcome of a matching request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    /// The registry returned no candidates
    NoCandidates,
    /// Candidates were found but all fell below the minimum confidence
    BelowThreshold,
}

/// Response of `find_probable_matches`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindParcelsResponse {
    pub success: bool,
    pub status: MatchStatus,
    pub message: String,
    pub candidates: Vec<MatchRecord>,
    pub count: usize,
    pub best_confidence: Option<f64>,
    pub geojson: Option<FeatureCollection>,
}

impl FindParcelsResponse {
    /// Successful response without matches
    pub fn no_match(status: MatchStatus, message: String) -> Self {
        Self {
            success: true,
            status,
            message,
            candidates: Vec::new(),
            count: 0,
            best_confidence: None,
            geojson: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.status == MatchStatus::Matched
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection_type_tag() {
        let json = serde_json::to_value(FeatureCollection::new(vec![])).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert!(json["features"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_no_match_response() {
        let response = FindParcelsResponse::no_match(
            MatchStatus::NoCandidates,
            "No matching parcels found".to_string(),
        );

        assert!(response.success);
        assert!(!response.is_match());
        assert_eq!(response.count, 0);
        assert!(response.geojson.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "no_candidates");
    }
}
