// Unit tests for scoring and ranking properties

use parcel_detective::config::{MatchingConfig, ScoringConfig};
use parcel_detective::core::{area_band, rank, score_one, settlement_token, year_band};
use parcel_detective::models::{
    BuildingAddress, BuildingCandidate, Criterion, ListingQuery, MatchScore, ParcelCandidate,
};

fn create_parcel(id: i64, area: f64, municipality: &str) -> ParcelCandidate {
    ParcelCandidate {
        id,
        parcel_number: format!("{}/1", id),
        cadastral_municipality_code: "1722".to_string(),
        cadastral_municipality_name: municipality.to_string(),
        area_m2: area,
        geometry: None,
    }
}

fn create_building(id: i64, parcel_id: i64, year: i32, floor_area: f64) -> BuildingCandidate {
    BuildingCandidate {
        id,
        parcel_id,
        building_number: Some(id.to_string()),
        construction_year: Some(year),
        net_floor_area_m2: Some(floor_area),
        story_count: Some(2),
        type_label: Some("Stanovanjska stavba".to_string()),
        address: BuildingAddress {
            street: Some("Celovška cesta".to_string()),
            house_number: Some("101".to_string()),
            settlement: Some("Ljubljana".to_string()),
            ..Default::default()
        },
    }
}

fn full_listing() -> ListingQuery {
    ListingQuery::new("Ljubljana Center", 542.0)
        .with_construction_year(1974)
        .with_net_floor_area(185.4)
}

#[test]
fn test_exact_match_example() {
    let config = ScoringConfig::default();
    let parcel = create_parcel(1, 542.0, "Ljubljana Center");
    let building = create_building(10, 1, 1974, 185.4);

    let score = score_one(&full_listing(), &parcel, Some(&building), &config);

    let expected = config.parcel_area_weight
        + config.construction_year_weight
        + config.building_area_weight
        + config.settlement_match_bonus;
    assert_eq!(score.total_score, expected);
    assert_eq!(score.total_score, 125);

    let expected_confidence = expected as f64 / config.max_possible_score() as f64 * 100.0;
    assert!((score.confidence - expected_confidence).abs() < 1e-9);
}

#[test]
fn test_fuzzy_parcel_area_example() {
    let config = ScoringConfig::default();
    let parcel = create_parcel(1, 547.0, "Ljubljana Center");
    let building = create_building(10, 1, 1974, 185.4);

    let score = score_one(&full_listing(), &parcel, Some(&building), &config);

    // 547 is 0.92% off 542: fuzzy tier, not full or near
    assert_eq!(score.breakdown.get(Criterion::ParcelArea), Some(30));
}

#[test]
fn test_listing_without_hints_never_scores_building_criteria() {
    let config = ScoringConfig::default();
    let listing = ListingQuery::new("Ljubljana Center", 542.0);
    let parcel = create_parcel(1, 542.0, "Ljubljana Center");
    let building = create_building(10, 1, 1974, 185.4);

    let score = score_one(&listing, &parcel, Some(&building), &config);

    assert!(score.breakdown.get(Criterion::ConstructionYear).unwrap_or(0) == 0);
    assert!(score.breakdown.get(Criterion::BuildingArea).unwrap_or(0) == 0);
    assert_eq!(score.total_score, 55);
}

#[test]
fn test_breakdown_sums_to_total_and_confidence_bounded() {
    let config = ScoringConfig::default();
    let listing = full_listing()
        .with_street_name("Celovška")
        .with_property_type("Hiša");

    for area in [530.0, 540.0, 541.5, 542.0, 543.0, 545.0, 547.0, 560.0] {
        for year in [1970, 1973, 1974, 1975] {
            for floor_area in [180.0, 184.0, 185.4, 187.0] {
                for municipality in ["Ljubljana Center", "Maribor"] {
                    let parcel = create_parcel(1, area, municipality);
                    let building = create_building(1, 1, year, floor_area);
                    let score = score_one(&listing, &parcel, Some(&building), &config);

                    let sum: u32 = score.breakdown.iter().map(|(_, points)| points).sum();
                    assert_eq!(sum, score.total_score);
                    assert!((0.0..=100.0).contains(&score.confidence));
                }
            }
        }
    }
}

#[test]
fn test_parcel_area_score_monotonic() {
    let config = ScoringConfig::default();
    let listing = ListingQuery::new("Koper", 1000.0);

    let mut previous = u32::MAX;
    for offset in [0.0, 0.5, 1.0, 3.0, 5.0, 7.5, 10.0, 12.0, 20.0] {
        let parcel = create_parcel(1, 1000.0 + offset, "Koper");
        let points = score_one(&listing, &parcel, None, &config)
            .breakdown
            .get(Criterion::ParcelArea)
            .unwrap_or(0);

        assert!(points <= previous, "score rose at offset {}", offset);
        previous = points;
    }
}

#[test]
fn test_zero_weights_give_zero_confidence() {
    let config = ScoringConfig {
        parcel_area_weight: 0,
        construction_year_weight: 0,
        building_area_weight: 0,
        street_match_bonus: 0,
        building_type_bonus: 0,
        settlement_match_bonus: 0,
        ..Default::default()
    };
    let parcel = create_parcel(1, 542.0, "Ljubljana Center");

    let score = score_one(&full_listing(), &parcel, None, &config);
    assert_eq!(score.total_score, 0);
    assert_eq!(score.confidence, 0.0);
}

fn scores() -> Vec<MatchScore> {
    let config = ScoringConfig::default();
    let listing = full_listing();

    [542.0, 547.0, 544.0, 600.0, 542.3, 545.5]
        .iter()
        .enumerate()
        .map(|(i, area)| {
            let id = i as i64 + 1;
            let parcel = create_parcel(id, *area, "Ljubljana Center");
            let building = create_building(id * 10, id, 1974, 185.4);
            score_one(&listing, &parcel, Some(&building), &config)
        })
        .collect()
}

#[test]
fn test_rank_returns_min_of_n_and_len() {
    for n in [0, 1, 3, 6, 10] {
        let ranked = rank(scores(), 0.0, n);
        assert_eq!(ranked.len(), n.min(6));

        for pair in ranked.windows(2) {
            assert!(pair[0].total_score >= pair[1].total_score);
        }
    }
}

#[test]
fn test_rank_idempotent() {
    for (min_confidence, n) in [(0.0, 3), (50.0, 2), (80.0, 10)] {
        let once = rank(scores(), min_confidence, n);
        let twice = rank(once.clone(), min_confidence, n);
        assert_eq!(once, twice);
    }
}

#[test]
fn test_rank_tie_break_is_deterministic() {
    let config = ScoringConfig::default();
    let listing = ListingQuery::new("Ljubljana", 542.0);

    let scores: Vec<MatchScore> = [7, 2, 5]
        .iter()
        .map(|id| score_one(&listing, &create_parcel(*id, 542.0, "Ljubljana"), None, &config))
        .collect();

    let ranked = rank(scores, 0.0, 3);
    let ids: Vec<i64> = ranked.iter().map(|s| s.parcel.id).collect();
    assert_eq!(ids, vec![2, 5, 7]);
}

#[test]
fn test_tolerance_bands() {
    let band = area_band(185.4, 0.01);
    assert!(band.contains(183.546 + 1e-9));
    assert!(band.contains(187.25));
    assert!(!band.contains(187.3));

    let years = year_band(1974, 1);
    assert!(years.contains(1973) && years.contains(1975));
    assert!(!years.contains(1976));

    let config = MatchingConfig::default();
    assert!(!config.parcel_area_band(542.0).is_empty());
    assert_eq!(settlement_token("  Nova Gorica - Center "), "nova gorica");
}
