use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parcel geometry as handed out by the registry (a GeoJSON geometry object)
///
/// The matcher never looks inside; it only passes the value through to the
/// projected feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geometry(pub serde_json::Value);

impl Geometry {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Cadastral parcel record (`parcele`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelCandidate {
    pub id: i64,
    pub parcel_number: String,
    pub cadastral_municipality_code: String,
    pub cadastral_municipality_name: String,
    pub area_m2: f64,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Structured address of a building
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub settlement: Option<String>,
    #[serde(default)]
    pub post_office: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl BuildingAddress {
    /// Street, house number and settlement joined with ", "
    pub fn full_address(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.street, &self.house_number, &self.settlement]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Building record (`stavbe`) attached to a parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCandidate {
    pub id: i64,
    /// Back-reference to the owning parcel's id
    pub parcel_id: i64,
    #[serde(default)]
    pub building_number: Option<String>,
    #[serde(default)]
    pub construction_year: Option<i32>,
    #[serde(default)]
    pub net_floor_area_m2: Option<f64>,
    #[serde(default)]
    pub story_count: Option<i32>,
    #[serde(default)]
    pub type_label: Option<String>,
    #[serde(default)]
    pub address: BuildingAddress,
}

/// A (parcel, building?) pair eligible for scoring
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub parcel: ParcelCandidate,
    pub building: Option<BuildingCandidate>,
}

impl Candidate {
    pub fn parcel_only(parcel: ParcelCandidate) -> Self {
        Self { parcel, building: None }
    }

    pub fn with_building(parcel: ParcelCandidate, building: BuildingCandidate) -> Self {
        Self {
            parcel,
            building: Some(building),
        }
    }
}

/// Scoring criteria, serialized as `parcel_area`, `construction_year`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    ParcelArea,
    ConstructionYear,
    BuildingArea,
    StreetMatch,
    BuildingType,
    SettlementMatch,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::ParcelArea => "parcel_area",
            Criterion::ConstructionYear => "construction_year",
            Criterion::BuildingArea => "building_area",
            Criterion::StreetMatch => "street_match",
            Criterion::BuildingType => "building_type",
            Criterion::SettlementMatch => "settlement_match",
        }
    }
}

/// Points awarded per criterion
///
/// Only criteria whose preconditions held are present. The sum of all entries
/// is always the total score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(BTreeMap<Criterion, u32>);

impl ScoreBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, criterion: Criterion, points: u32) {
        self.0.insert(criterion, points);
    }

    pub fn get(&self, criterion: Criterion) -> Option<u32> {
        self.0.get(&criterion).copied()
    }

    pub fn contains(&self, criterion: Criterion) -> bool {
        self.0.contains_key(&criterion)
    }

    pub fn total(&self) -> u32 {
        self.0
            .values()
            .fold(0u32, |total, points| total.saturating_add(*points))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, u32)> + '_ {
        self.0.iter().map(|(criterion, points)| (*criterion, *points))
    }
}

/// Score of one candidate against a listing
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub total_score: u32,
    /// Derived from `total_score` and the scoring configuration, 0..=100
    pub confidence: f64,
    pub breakdown: ScoreBreakdown,
    pub parcel: ParcelCandidate,
    pub building: Option<BuildingCandidate>,
}

/// Closed numeric acceptance interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaBand {
    pub min: f64,
    pub max: f64,
}

impl AreaBand {
    /// A band is empty when it is inverted or has a non-finite bound
    pub fn is_empty(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Closed integer interval of construction years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBand {
    pub min: i32,
    pub max: i32,
}

impl YearBand {
    #[inline]
    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

/// Parcel lookup sent to the registry
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelQuery {
    pub area_band: AreaBand,
    /// Lower-cased leading token of the listing's settlement
    pub settlement_token: String,
}

/// Building constraints for the inner join; `None` bands are not applied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildingFilter {
    pub year_band: Option<YearBand>,
    pub floor_area_band: Option<AreaBand>,
}

impl BuildingFilter {
    /// Unknown building attributes never satisfy an active band
    pub fn accepts(&self, building: &BuildingCandidate) -> bool {
        let year_ok = match self.year_band {
            Some(band) => building
                .construction_year
                .map_or(false, |year| band.contains(year)),
            None => true,
        };

        let area_ok = match self.floor_area_band {
            Some(band) => building
                .net_floor_area_m2
                .map_or(false, |area| band.contains(area)),
            None => true,
        };

        year_ok && area_ok
    }
}
