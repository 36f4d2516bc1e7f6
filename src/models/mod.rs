// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AreaBand, BuildingAddress, BuildingCandidate, BuildingFilter, Candidate, Criterion, Geometry,
    MatchScore, ParcelCandidate, ParcelQuery, ScoreBreakdown, YearBand,
};
pub use requests::ListingQuery;
pub use responses::{
    BuildingRecord, ConfidenceTier, ErrorResponse, Feature, FeatureCollection, FeatureProperties,
    FindParcelsResponse, HealthResponse, MatchRecord, MatchStatus, ParcelRecord,
};
