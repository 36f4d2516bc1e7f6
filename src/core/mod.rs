// Core algorithm exports
pub mod finder;
pub mod matcher;
pub mod projection;
pub mod ranking;
pub mod scoring;
pub mod tolerance;

pub use finder::CandidateFinder;
pub use matcher::Matcher;
pub use projection::{project, Projection};
pub use ranking::rank;
pub use scoring::{score_all, score_one};
pub use tolerance::{area_band, relative_difference_pct, settlement_token, year_band};
