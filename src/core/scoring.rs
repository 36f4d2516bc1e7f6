use crate::config::ScoringConfig;
use crate::core::tolerance::{relative_difference_pct, settlement_token};
use crate::models::{
    BuildingCandidate, Candidate, Criterion, ListingQuery, MatchScore, ParcelCandidate,
    ScoreBreakdown,
};

/// Relative-difference breakpoints (percent) for full, near and fuzzy tiers
#[derive(Debug, Clone, Copy)]
struct AreaTiers {
    exact: f64,
    near: f64,
    fuzzy: f64,
}

const PARCEL_AREA_TIERS: AreaTiers = AreaTiers { exact: 0.1, near: 0.5, fuzzy: 1.0 };
const BUILDING_AREA_TIERS: AreaTiers = AreaTiers { exact: 0.1, near: 1.0, fuzzy: 2.0 };

const HOUSE_MARKERS: [&str; 3] = ["hiša", "hisa", "house"];
const RESIDENTIAL_MARKERS: [&str; 2] = ["stanov", "residential"];

/// Score one (parcel, building?) candidate against a listing
///
/// Scoring rules:
/// - parcel area (always): full / near / fuzzy tier by relative difference
/// - construction year: exact or ±1 year, when listing and building both have one
/// - building floor area: tiered like parcel area with wider breakpoints
/// - bonuses for street, building type and settlement agreement
///
/// Pure function of its inputs; confidence is derived from the total.
pub fn score_one(
    listing: &ListingQuery,
    parcel: &ParcelCandidate,
    building: Option<&BuildingCandidate>,
    config: &ScoringConfig,
) -> MatchScore {
    let mut breakdown = ScoreBreakdown::new();

    breakdown.record(
        Criterion::ParcelArea,
        score_area(
            listing.parcel_area_m2,
            parcel.area_m2,
            config.parcel_area_weight,
            PARCEL_AREA_TIERS,
            config,
        ),
    );

    if let Some(building) = building {
        if let (Some(listing_year), Some(building_year)) =
            (listing.construction_year, building.construction_year)
        {
            breakdown.record(
                Criterion::ConstructionYear,
                score_year(listing_year, building_year, config),
            );
        }

        if let (Some(listing_area), Some(building_area)) =
            (listing.net_floor_area_m2, building.net_floor_area_m2)
        {
            breakdown.record(
                Criterion::BuildingArea,
                score_area(
                    listing_area,
                    building_area,
                    config.building_area_weight,
                    BUILDING_AREA_TIERS,
                    config,
                ),
            );
        }

        if street_matches(listing.street_name.as_deref(), building) {
            breakdown.record(Criterion::StreetMatch, config.street_match_bonus);
        }

        if building_type_matches(listing.property_type.as_deref(), building) {
            breakdown.record(Criterion::BuildingType, config.building_type_bonus);
        }
    }

    if settlement_matches(&listing.settlement, &parcel.cadastral_municipality_name) {
        breakdown.record(Criterion::SettlementMatch, config.settlement_match_bonus);
    }

    let total_score = breakdown.total();

    MatchScore {
        total_score,
        confidence: config.confidence(total_score),
        breakdown,
        parcel: parcel.clone(),
        building: building.cloned(),
    }
}

/// Score every candidate, preserving order
pub fn score_all(
    listing: &ListingQuery,
    candidates: &[Candidate],
    config: &ScoringConfig,
) -> Vec<MatchScore> {
    candidates
        .iter()
        .map(|candidate| score_one(listing, &candidate.parcel, candidate.building.as_ref(), config))
        .collect()
}

/// Tiered area score; outside every tier yields 0
#[inline]
fn score_area(
    listing_area: f64,
    candidate_area: f64,
    weight: u32,
    tiers: AreaTiers,
    config: &ScoringConfig,
) -> u32 {
    let diff_pct = relative_difference_pct(listing_area, candidate_area);

    if diff_pct <= tiers.exact {
        weight
    } else if diff_pct <= tiers.near {
        scaled(weight, config.area_near_match_multiplier)
    } else if diff_pct <= tiers.fuzzy {
        scaled(weight, config.area_fuzzy_match_multiplier)
    } else {
        0
    }
}

#[inline]
fn score_year(listing_year: i32, building_year: i32, config: &ScoringConfig) -> u32 {
    match listing_year.abs_diff(building_year) {
        0 => config.construction_year_weight,
        1 => scaled(config.construction_year_weight, config.year_near_match_multiplier),
        _ => 0,
    }
}

/// Weight times multiplier, truncated toward zero
#[inline]
fn scaled(weight: u32, multiplier: f64) -> u32 {
    (weight as f64 * multiplier).max(0.0) as u32
}

fn street_matches(listing_street: Option<&str>, building: &BuildingCandidate) -> bool {
    let listing_street = match listing_street {
        Some(street) if !street.is_empty() => street.to_lowercase(),
        _ => return false,
    };

    building
        .address
        .street
        .as_deref()
        .map_or(false, |street| street.to_lowercase().contains(&listing_street))
}

/// House-like listings earn the bonus on residential buildings only.
/// Other combinations never award (and never penalize).
fn building_type_matches(listing_type: Option<&str>, building: &BuildingCandidate) -> bool {
    let type_label = building.type_label.as_deref();
    let (Some(listing_type), Some(type_label)) = (listing_type, type_label) else {
        return false;
    };

    let listing_type = listing_type.to_lowercase();
    let type_label = type_label.to_lowercase();

    HOUSE_MARKERS.iter().any(|marker| listing_type.contains(marker))
        && RESIDENTIAL_MARKERS.iter().any(|marker| type_label.contains(marker))
}

fn settlement_matches(settlement: &str, municipality_name: &str) -> bool {
    let token = settlement_token(settlement);
    !token.is_empty() && municipality_name.to_lowercase().contains(&token)
}
