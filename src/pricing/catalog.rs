use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::CostInputs;

/// Job complexity tier, multiplying both material and labor base costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityClass {
    Simple,
    Standard,
    Complex,
    Custom,
}

impl ComplexityClass {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::Standard => "Standard",
            Self::Complex => "Complex",
            Self::Custom => "Custom",
        }
    }

    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Simple => 0.9,
            Self::Standard => 1.0,
            Self::Complex => 1.2,
            Self::Custom => 1.4,
        }
    }
}

/// Seasonal demand window, applied to labor only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Peak,
    Shoulder,
    OffSeason,
}

impl Season {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Peak => "Peak",
            Self::Shoulder => "Shoulder",
            Self::OffSeason => "Off-Season",
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        match date.month() {
            6..=9 => Self::Peak,
            4 | 5 | 10 => Self::Shoulder,
            _ => Self::OffSeason,
        }
    }

    pub const fn labor_multiplier(self) -> f64 {
        match self {
            Self::Peak => 1.15,
            Self::Shoulder => 1.0,
            Self::OffSeason => 0.92,
        }
    }
}

/// Cost-of-doing-business region, applied to both cost lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionZone {
    Metro,
    Suburban,
    Rural,
}

impl RegionZone {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Metro => "Metro",
            Self::Suburban => "Suburban",
            Self::Rural => "Rural",
        }
    }

    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Metro => 1.1,
            Self::Suburban => 1.0,
            Self::Rural => 0.95,
        }
    }
}

/// Catalog record describing per-unit base costs and the default buffers a
/// job of this kind starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostTemplate {
    pub material_base_cost_per_unit: f64,
    pub labor_base_cost_per_unit: f64,
    pub waste_factor_percent: f64,
    pub contingency_percent: f64,
}

impl CostTemplate {
    /// Company-standard asphalt template: per-square material and labor with
    /// the default waste and contingency buffers.
    pub fn standard() -> Self {
        Self {
            material_base_cost_per_unit: 185.0,
            labor_base_cost_per_unit: 140.0,
            waste_factor_percent: 10.0,
            contingency_percent: 5.0,
        }
    }

    /// Scale the template to a measured job. Complexity and region multiply
    /// both cost lines; season multiplies labor only. Waste and contingency
    /// stay percentages for the engine to apply.
    pub fn cost_inputs(
        &self,
        measured_area: f64,
        complexity: ComplexityClass,
        season: Season,
        region: RegionZone,
        fixed_costs: f64,
    ) -> CostInputs {
        let shared = complexity.multiplier() * region.multiplier();
        CostInputs {
            material_base_cost: self.material_base_cost_per_unit * measured_area * shared,
            labor_base_cost: self.labor_base_cost_per_unit
                * measured_area
                * shared
                * season.labor_multiplier(),
            waste_factor_percent: self.waste_factor_percent,
            contingency_percent: self.contingency_percent,
            fixed_costs,
            measured_area,
        }
    }
}
