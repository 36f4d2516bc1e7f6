use tracing::{info, warn};

use crate::config::{MatchingConfig, ProjectionConfig, ScoringConfig, Settings};
use crate::core::{
    finder::CandidateFinder,
    projection::project,
    ranking::rank,
    scoring::{score_all, score_one},
};
use crate::error::MatchError;
use crate::models::{
    BuildingCandidate, FindParcelsResponse, ListingQuery, MatchScore, MatchStatus, ParcelCandidate,
};
use crate::services::ParcelRegistry;

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Listing validation
/// 2. Tolerance-bounded candidate retrieval
/// 3. Scoring
/// 4. Confidence filter and ranking
/// 5. Projection into records and a feature collection
///
/// Holds immutable configuration built once at startup; every call borrows it.
#[derive(Debug, Clone)]
pub struct Matcher {
    finder: CandidateFinder,
    matching: MatchingConfig,
    scoring: ScoringConfig,
    projection: ProjectionConfig,
}

impl Matcher {
    pub fn new(matching: MatchingConfig, scoring: ScoringConfig, projection: ProjectionConfig) -> Self {
        Self {
            finder: CandidateFinder::new(matching.clone()),
            matching,
            scoring,
            projection,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.matching.clone(),
            settings.scoring.clone(),
            settings.projection.clone(),
        )
    }

    pub fn with_default_config() -> Self {
        Self::new(
            MatchingConfig::default(),
            ScoringConfig::default(),
            ProjectionConfig::default(),
        )
    }

    pub fn matching_config(&self) -> &MatchingConfig {
        &self.matching
    }

    pub fn scoring_config(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Score a single candidate with this matcher's weights
    pub fn score_one(
        &self,
        listing: &ListingQuery,
        parcel: &ParcelCandidate,
        building: Option<&BuildingCandidate>,
    ) -> MatchScore {
        score_one(listing, parcel, building, &self.scoring)
    }

    /// Find the most probable parcels for a listing
    ///
    /// # Returns
    /// A response with the ranked records, their count, the best confidence
    /// and a feature collection. "No candidates" and "below threshold" are
    /// successful responses with `count == 0`.
    ///
    /// # Errors
    /// `MatchError::Validation` before any registry access, or the registry
    /// failure / timeout unchanged.
    pub async fn find_probable_matches(
        &self,
        listing: &ListingQuery,
        registry: &dyn ParcelRegistry,
    ) -> Result<FindParcelsResponse, MatchError> {
        if let Err(errors) = listing.validate_listing() {
            let error = MatchError::from(errors);
            warn!("Rejected listing: {}", error);
            return Err(error);
        }

        let candidates = self.finder.find(listing, registry).await?;

        if candidates.is_empty() {
            info!("No candidates for settlement '{}'", listing.settlement);
            return Ok(FindParcelsResponse::no_match(
                MatchStatus::NoCandidates,
                "No matching parcels found".to_string(),
            ));
        }

        let total_candidates = candidates.len();
        let scores = score_all(listing, &candidates, &self.scoring);
        let ranked = rank(scores, self.matching.min_confidence, self.matching.max_results);

        let best = match ranked.first() {
            Some(best) => best,
            None => {
                info!(
                    "{} candidates, none at or above {}% confidence",
                    total_candidates, self.matching.min_confidence
                );
                return Ok(FindParcelsResponse::no_match(
                    MatchStatus::BelowThreshold,
                    format!(
                        "Found {} candidates but none meet minimum confidence threshold of {}%",
                        total_candidates, self.matching.min_confidence
                    ),
                ));
            }
        };

        let message = format!(
            "Parcel {} in cadastral municipality {} matches with {:.1}% confidence",
            best.parcel.parcel_number, best.parcel.cadastral_municipality_name, best.confidence
        );
        let best_confidence = best.confidence;

        let projection = project(&ranked, &self.projection);

        info!(
            "Returning {} matches (from {} candidates), best confidence {:.2}%",
            projection.records.len(),
            total_candidates,
            best_confidence
        );

        Ok(FindParcelsResponse {
            success: true,
            status: MatchStatus::Matched,
            message,
            count: projection.records.len(),
            best_confidence: projection.records.first().map(|record| record.confidence),
            candidates: projection.records,
            geojson: Some(projection.feature_collection),
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildingAddress, Criterion};
    use crate::services::InMemoryRegistry;

    fn parcel(id: i64, area: f64) -> ParcelCandidate {
        ParcelCandidate {
            id,
            parcel_number: format!("{}/4", id),
            cadastral_municipality_code: "1730".to_string(),
            cadastral_municipality_name: "Ljubljana Center".to_string(),
            area_m2: area,
            geometry: Some(crate::models::Geometry::new(serde_json::json!({
                "type": "Point",
                "coordinates": [14.5, 46.05]
            }))),
        }
    }

    fn building(id: i64, parcel_id: i64, year: i32, floor_area: f64) -> BuildingCandidate {
        BuildingCandidate {
            id,
            parcel_id,
            building_number: None,
            construction_year: Some(year),
            net_floor_area_m2: Some(floor_area),
            story_count: Some(2),
            type_label: Some("Stanovanjska stavba".to_string()),
            address: BuildingAddress::default(),
        }
    }

    #[tokio::test]
    async fn test_find_probable_matches_exact() {
        let matcher = Matcher::with_default_config();
        let registry = InMemoryRegistry::new(
            vec![parcel(1, 542.0), parcel(2, 547.0)],
            vec![building(10, 1, 1974, 185.4), building(20, 2, 1975, 186.0)],
        );
        let listing = ListingQuery::new("Ljubljana Center", 542.0)
            .with_construction_year(1974)
            .with_net_floor_area(185.4);

        let response = matcher.find_probable_matches(&listing, &registry).await.unwrap();

        assert_eq!(response.status, MatchStatus::Matched);
        assert_eq!(response.count, 2);
        assert_eq!(response.candidates[0].parcel.id, 1);
        assert_eq!(response.candidates[0].score, 125);
        assert_eq!(response.best_confidence, Some(83.33));
        assert_eq!(response.geojson.as_ref().map(|g| g.len()), Some(2));
    }

    #[tokio::test]
    async fn test_validation_happens_before_registry() {
        let matcher = Matcher::with_default_config();
        let registry = InMemoryRegistry::default();
        let listing = ListingQuery::new("", 542.0);

        let result = matcher.find_probable_matches(&listing, &registry).await;
        assert!(matches!(result, Err(MatchError::Validation(_))));
    }

    #[tokio::test]
    async fn test_below_threshold_is_not_an_error() {
        let matcher = Matcher::with_default_config();
        let registry = InMemoryRegistry::new(vec![parcel(1, 547.0)], vec![]);
        let listing = ListingQuery::new("Ljubljana Center", 542.0);

        let response = matcher.find_probable_matches(&listing, &registry).await.unwrap();

        // 30 (fuzzy area) + 5 (settlement) of 150
        assert_eq!(response.status, MatchStatus::BelowThreshold);
        assert_eq!(response.count, 0);
        assert!(response.message.contains("minimum confidence"));
    }

    #[test]
    fn test_from_settings_carries_configuration() {
        let mut settings = Settings::default();
        settings.matching.max_results = 5;
        settings.scoring.settlement_match_bonus = 8;

        let matcher = Matcher::from_settings(&settings);
        assert_eq!(matcher.matching_config().max_results, 5);
        assert_eq!(matcher.scoring_config().max_possible_score(), 153);
    }

    #[test]
    fn test_score_one_uses_matcher_weights() {
        let scoring = ScoringConfig {
            parcel_area_weight: 100,
            ..Default::default()
        };
        let matcher = Matcher::new(MatchingConfig::default(), scoring, ProjectionConfig::default());
        let listing = ListingQuery::new("Ljubljana", 542.0);

        let score = matcher.score_one(&listing, &parcel(1, 542.0), None);
        assert_eq!(score.breakdown.get(Criterion::ParcelArea), Some(100));
        assert_eq!(score.total_score, 105);
    }
}
