use crate::config::ProjectionConfig;
use crate::models::{
    BuildingRecord, Feature, FeatureCollection, FeatureProperties, MatchRecord, MatchScore,
    ParcelRecord,
};
use crate::models::responses::FeatureType;

/// Ranked matches in both output shapes
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub records: Vec<MatchRecord>,
    pub feature_collection: FeatureCollection,
}

/// Convert ranked scores into result records and a feature collection
///
/// Ranks are 1-based positions in `ranked`. Candidates without a geometry
/// stay in `records` but get no feature.
pub fn project(ranked: &[MatchScore], config: &ProjectionConfig) -> Projection {
    let records = ranked.iter().map(to_record).collect();

    let features = ranked
        .iter()
        .enumerate()
        .filter_map(|(index, score)| to_feature(score, index + 1, config))
        .collect();

    Projection {
        records,
        feature_collection: FeatureCollection::new(features),
    }
}

/// Plain result record for one match
pub fn to_record(score: &MatchScore) -> MatchRecord {
    MatchRecord {
        parcel: ParcelRecord::from(&score.parcel),
        building: score.building.as_ref().map(BuildingRecord::from),
        confidence: round2(score.confidence),
        score: score.total_score,
        score_breakdown: score.breakdown.clone(),
    }
}

/// GeoJSON feature for one match, `None` when the parcel has no geometry
pub fn to_feature(score: &MatchScore, rank: usize, config: &ProjectionConfig) -> Option<Feature> {
    let geometry = score.parcel.geometry.clone()?;
    let parcel = &score.parcel;
    let building = score.building.as_ref();

    let properties = FeatureProperties {
        parcel_id: parcel.id,
        parcel_number: parcel.parcel_number.clone(),
        cadastral_municipality_code: parcel.cadastral_municipality_code.clone(),
        cadastral_municipality_name: parcel.cadastral_municipality_name.clone(),
        rank,
        confidence: round2(score.confidence),
        score: score.total_score,
        score_breakdown: score.breakdown.clone(),
        area_m2: parcel.area_m2,
        tier: config.tier(score.confidence),
        color: config.color_for(score.confidence).to_string(),
        opacity: config.opacity_for(score.confidence),
        building_id: building.map(|b| b.id),
        construction_year: building.and_then(|b| b.construction_year),
        net_floor_area_m2: building.and_then(|b| b.net_floor_area_m2),
        address: building.and_then(|b| b.address.full_address()),
        building_type: building.and_then(|b| b.type_label.clone()),
    };

    Some(Feature {
        kind: FeatureType::Feature,
        geometry,
        properties,
    })
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BuildingAddress, BuildingCandidate, ConfidenceTier, Criterion, Geometry, ParcelCandidate,
        ScoreBreakdown,
    };
    use serde_json::json;

    fn score(id: i64, total_score: u32, confidence: f64, with_geometry: bool) -> MatchScore {
        let mut breakdown = ScoreBreakdown::new();
        breakdown.record(Criterion::ParcelArea, total_score);

        MatchScore {
            total_score,
            confidence,
            breakdown,
            parcel: ParcelCandidate {
                id,
                parcel_number: format!("{}/2", id),
                cadastral_municipality_code: "1737".to_string(),
                cadastral_municipality_name: "Tabor".to_string(),
                area_m2: 542.0,
                geometry: with_geometry.then(|| {
                    Geometry::new(json!({
                        "type": "Polygon",
                        "coordinates": [[[14.5, 46.05], [14.51, 46.05], [14.51, 46.06], [14.5, 46.05]]]
                    }))
                }),
            },
            building: None,
        }
    }

    #[test]
    fn test_records_and_features_align() {
        let config = ProjectionConfig::default();
        let ranked = vec![score(1, 140, 93.333333, true), score(2, 125, 83.333333, true)];

        let projection = project(&ranked, &config);

        assert_eq!(projection.records.len(), 2);
        assert_eq!(projection.feature_collection.len(), 2);
        assert_eq!(projection.records[0].confidence, 93.33);

        let first = &projection.feature_collection.features[0].properties;
        assert_eq!(first.rank, 1);
        assert_eq!(first.tier, ConfidenceTier::High);
        assert_eq!(first.color, "#22c55e");
        assert_eq!(first.opacity, 0.7);

        let second = &projection.feature_collection.features[1].properties;
        assert_eq!(second.rank, 2);
        assert_eq!(second.tier, ConfidenceTier::Medium);
        assert_eq!(second.confidence, 83.33);
    }

    #[test]
    fn test_missing_geometry_skipped_in_features_only() {
        let config = ProjectionConfig::default();
        let ranked = vec![score(1, 140, 93.3, false), score(2, 100, 66.7, true)];

        let projection = project(&ranked, &config);

        assert_eq!(projection.records.len(), 2);
        assert_eq!(projection.feature_collection.len(), 1);

        let feature = &projection.feature_collection.features[0];
        assert_eq!(feature.properties.parcel_id, 2);
        assert_eq!(feature.properties.rank, 2);
        assert_eq!(feature.properties.color, "#ef4444");
        assert_eq!(feature.properties.opacity, 0.5);
    }

    #[test]
    fn test_geometry_passed_through_unchanged() {
        let config = ProjectionConfig::default();
        let ranked = vec![score(1, 140, 93.3, true)];
        let projection = project(&ranked, &config);

        assert_eq!(
            projection.feature_collection.features[0].geometry.as_json(),
            ranked[0].parcel.geometry.as_ref().unwrap().as_json()
        );

        let json = serde_json::to_value(&projection.feature_collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0][1][0], 14.51);
        assert!(json["features"][0]["properties"].get("building_id").is_none());
    }

    #[test]
    fn test_building_fields_projected() {
        let config = ProjectionConfig::default();
        let mut ranked = score(1, 140, 93.3, true);
        ranked.building = Some(BuildingCandidate {
            id: 77,
            parcel_id: 1,
            building_number: Some("3".to_string()),
            construction_year: Some(1974),
            net_floor_area_m2: Some(185.4),
            story_count: Some(2),
            type_label: Some("Stanovanjska".to_string()),
            address: BuildingAddress {
                street: Some("Slovenska cesta".to_string()),
                house_number: Some("12".to_string()),
                ..Default::default()
            },
        });

        let projection = project(&[ranked], &config);
        let record = &projection.records[0];
        let properties = &projection.feature_collection.features[0].properties;

        assert_eq!(record.building.as_ref().map(|b| b.id), Some(77));
        assert_eq!(
            record.building.as_ref().and_then(|b| b.address.clone()).as_deref(),
            Some("Slovenska cesta, 12")
        );
        assert_eq!(properties.building_id, Some(77));
        assert_eq!(properties.construction_year, Some(1974));
        assert_eq!(properties.building_type.as_deref(), Some("Stanovanjska"));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(83.333333), 83.33);
        assert_eq!(round2(66.666666), 66.67);
    }
}
