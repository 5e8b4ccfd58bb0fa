use serde::{Deserialize, Serialize};

/// Identifier for a persisted estimate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EstimateId(pub String);

/// Identifier for a sales representative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepId(pub String);

/// How a representative is paid on a closed deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStructure {
    /// Percentage of remaining profit after overhead (and any prior deduction).
    ProfitSplit,
    /// Percentage of the total selling price, independent of profit.
    SalesPercentage,
}

impl CommissionStructure {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProfitSplit => "Profit Split",
            Self::SalesPercentage => "Percentage of Contract",
        }
    }
}

/// Raw representative record as supplied by the staffing system. Optional
/// fields are filled from the documented defaults by the rate resolver; no
/// other code path may default them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepRateProfile {
    pub rep_id: RepId,
    pub overhead_percent: Option<f64>,
    pub personal_overhead_percent: Option<f64>,
    pub commission_percent: Option<f64>,
    pub commission_structure: Option<CommissionStructure>,
}

/// Fully resolved rate configuration for one representative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Company-default overhead percentage.
    pub overhead_percent: f64,
    /// Personal override; wins over the company default when present and > 0.
    pub personal_overhead_percent: Option<f64>,
    pub commission_percent: f64,
    pub commission_structure: CommissionStructure,
}

impl RateConfig {
    /// The single load-bearing precedence rule: the personal override applies
    /// only when present and strictly positive.
    pub fn effective_overhead_percent(&self) -> f64 {
        match self.personal_overhead_percent {
            Some(personal) if personal > 0.0 => personal,
            _ => self.overhead_percent,
        }
    }
}

/// Pool shares for a two-representative profit split. Constructed only through
/// the split-eligible assignment variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitShares {
    pub primary_percent: f64,
    pub secondary_percent: f64,
}

impl SplitShares {
    pub fn total(&self) -> f64 {
        self.primary_percent + self.secondary_percent
    }
}

/// Representative assignment on an estimate. Split percentages exist only on
/// the split-eligible variant, so ineligible combinations cannot carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RepAssignment {
    Single {
        primary: RateConfig,
    },
    Dual {
        primary: RateConfig,
        secondary: RateConfig,
    },
    ProfitSplit {
        primary: RateConfig,
        secondary: RateConfig,
        shares: SplitShares,
    },
}

impl RepAssignment {
    /// Build the split-eligible variant, rejecting combinations the split
    /// rules forbid: both representatives must be on profit split and their
    /// resolved overhead rates must match exactly, and the shares must total
    /// 100.
    pub fn profit_split(
        primary: RateConfig,
        secondary: RateConfig,
        shares: SplitShares,
    ) -> Result<Self, EngineError> {
        if primary.commission_structure != CommissionStructure::ProfitSplit
            || secondary.commission_structure != CommissionStructure::ProfitSplit
            || primary.effective_overhead_percent() != secondary.effective_overhead_percent()
        {
            return Err(EngineError::IneligibleSplit {
                primary_overhead_percent: primary.effective_overhead_percent(),
                secondary_overhead_percent: secondary.effective_overhead_percent(),
            });
        }
        if shares.total() != 100.0 {
            return Err(EngineError::SplitConfiguration {
                primary_percent: shares.primary_percent,
                secondary_percent: shares.secondary_percent,
            });
        }

        Ok(Self::ProfitSplit {
            primary,
            secondary,
            shares,
        })
    }

    pub fn primary(&self) -> &RateConfig {
        match self {
            Self::Single { primary }
            | Self::Dual { primary, .. }
            | Self::ProfitSplit { primary, .. } => primary,
        }
    }

    pub fn secondary(&self) -> Option<&RateConfig> {
        match self {
            Self::Single { .. } => None,
            Self::Dual { secondary, .. } | Self::ProfitSplit { secondary, .. } => Some(secondary),
        }
    }

    /// Sum of the commission percentages that are fractions of the selling
    /// price. Only percentage-of-contract structures qualify; profit-split
    /// commissions come out of gross profit after the price is solved.
    pub fn sales_commission_percent(&self) -> f64 {
        let mut percent = 0.0;
        if self.primary().commission_structure == CommissionStructure::SalesPercentage {
            percent += self.primary().commission_percent;
        }
        if let Some(secondary) = self.secondary() {
            if secondary.commission_structure == CommissionStructure::SalesPercentage {
                percent += secondary.commission_percent;
            }
        }
        percent
    }
}

/// Base costs for an estimate, before margin solving. All monetary fields are
/// non-negative; `validate` enforces that before any arithmetic runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub material_base_cost: f64,
    pub labor_base_cost: f64,
    pub waste_factor_percent: f64,
    pub contingency_percent: f64,
    /// Permits, dumpsters, and other pass-through costs.
    pub fixed_costs: f64,
    /// Measured job size, in squares. Used only for the per-unit price on the
    /// breakdown; zero yields a zero per-unit price.
    pub measured_area: f64,
}

impl CostInputs {
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("material_base_cost", self.material_base_cost),
            ("labor_base_cost", self.labor_base_cost),
            ("waste_factor_percent", self.waste_factor_percent),
            ("contingency_percent", self.contingency_percent),
            ("fixed_costs", self.fixed_costs),
            ("measured_area", self.measured_area),
        ];
        for (field, value) in fields {
            if value < 0.0 || !value.is_finite() {
                return Err(EngineError::NegativeCost { field, value });
            }
        }
        Ok(())
    }
}

/// Company-level percentage targets, both expressed as fractions of the final
/// selling price. Representative commission percentages live on the
/// assignment, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPercentages {
    pub overhead_percent: f64,
    pub target_margin_percent: f64,
}

/// Complete pricing outcome for an estimate. Immutable once produced; a
/// recompute replaces the whole record rather than patching fields, because
/// the fields are mutually dependent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateBreakdown {
    pub selling_price: f64,
    pub material_total: f64,
    pub labor_total: f64,
    pub material_markup_percent: f64,
    pub labor_markup_percent: f64,
    pub overhead_amount: f64,
    pub primary_commission_amount: f64,
    pub secondary_commission_amount: f64,
    pub target_profit_amount: f64,
    pub company_net: f64,
    pub price_per_unit_area: f64,
}

/// Error taxonomy for the pricing engine. Every failure is a typed result;
/// the coordinator surfaces them unchanged and callers must block estimate
/// finalization on any of them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("overhead, margin, and commission percentages total {total_percent}%, leaving nothing for costs")]
    MarginConfiguration { total_percent: f64 },
    #[error("split shares must total 100, got {primary_percent} + {secondary_percent}")]
    SplitConfiguration {
        primary_percent: f64,
        secondary_percent: f64,
    },
    #[error("profit split requires both representatives on profit split with matching effective overhead ({primary_overhead_percent}% vs {secondary_overhead_percent}%)")]
    IneligibleSplit {
        primary_overhead_percent: f64,
        secondary_overhead_percent: f64,
    },
    #[error("no rate configuration for representative {0}")]
    MissingRateConfig(String),
    #[error("cost input {field} must be a non-negative number, got {value}")]
    NegativeCost { field: &'static str, value: f64 },
}
