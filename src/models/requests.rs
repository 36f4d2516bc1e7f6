use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::core::tolerance::settlement_token;

/// Listing description as extracted from a real-estate advert
///
/// `settlement` and `parcel_area_m2` are mandatory. A listing missing either
/// deserializes to an empty/zero value and is rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ListingQuery {
    #[validate(length(min = 1, message = "settlement is required"))]
    #[serde(default)]
    pub settlement: String,

    #[validate(range(exclusive_min = 0.0, message = "parcel_area_m2 must be positive"))]
    #[serde(default, alias = "parcelAreaM2")]
    pub parcel_area_m2: f64,

    #[validate(range(min = 1, message = "construction_year must be positive"))]
    #[serde(default, alias = "constructionYear")]
    pub construction_year: Option<i32>,

    #[validate(range(exclusive_min = 0.0, message = "net_floor_area_m2 must be positive"))]
    #[serde(default, alias = "netFloorAreaM2")]
    pub net_floor_area_m2: Option<f64>,

    #[serde(default, alias = "propertyType")]
    pub property_type: Option<String>,

    #[serde(default, alias = "streetName")]
    pub street_name: Option<String>,
}

impl ListingQuery {
    pub fn new(settlement: impl Into<String>, parcel_area_m2: f64) -> Self {
        Self {
            settlement: settlement.into(),
            parcel_area_m2,
            ..Default::default()
        }
    }

    pub fn with_construction_year(mut self, year: i32) -> Self {
        self.construction_year = Some(year);
        self
    }

    pub fn with_net_floor_area(mut self, area_m2: f64) -> Self {
        self.net_floor_area_m2 = Some(area_m2);
        self
    }

    pub fn with_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into());
        self
    }

    pub fn with_street_name(mut self, street_name: impl Into<String>) -> Self {
        self.street_name = Some(street_name.into());
        self
    }

    /// True when the listing carries a construction year or a floor area.
    /// Such listings only match parcels that have a building record.
    pub fn has_building_hints(&self) -> bool {
        self.construction_year.is_some() || self.net_floor_area_m2.is_some()
    }

    /// Derive validation plus the checks attributes cannot express
    /// (blank settlement, non-finite numbers).
    pub fn validate_listing(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if !self.settlement.is_empty() && settlement_token(&self.settlement).is_empty() {
            errors.add(
                "settlement",
                message_error("blank", "settlement must name a place before any '-'"),
            );
        }
        if !self.parcel_area_m2.is_finite() {
            errors.add("parcel_area_m2", message_error("finite", "parcel_area_m2 must be finite"));
        }
        if self.net_floor_area_m2.map_or(false, |area| !area.is_finite()) {
            errors.add(
                "net_floor_area_m2",
                message_error("finite", "net_floor_area_m2 must be finite"),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
