use crate::models::{AreaBand, YearBand};

/// Calculate the closed acceptance band `[value*(1-tol), value*(1+tol)]`
///
/// # Arguments
/// * `value` - Target area in square meters
/// * `tolerance` - Relative tolerance (0.01 = ±1%)
///
/// # Returns
/// AreaBand with min/max bounds
pub fn area_band(value: f64, tolerance: f64) -> AreaBand {
    let delta = value * tolerance;

    AreaBand {
        min: value - delta,
        max: value + delta,
    }
}

/// Calculate the inclusive construction-year band `[year-tol, year+tol]`
pub fn year_band(year: i32, tolerance: i32) -> YearBand {
    YearBand {
        min: year.saturating_sub(tolerance),
        max: year.saturating_add(tolerance),
    }
}

/// Leading settlement token used for municipality matching
///
/// Listings name settlements like "Ljubljana - Center"; only the part before
/// the first hyphen is compared, trimmed and lower-cased.
pub fn settlement_token(settlement: &str) -> String {
    settlement
        .split('-')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Relative difference of `candidate` from `reference`, in percent of `reference`
#[inline]
pub fn relative_difference_pct(reference: f64, candidate: f64) -> f64 {
    (reference - candidate).abs() / reference * 100.0
}
