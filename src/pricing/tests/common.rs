use crate::pricing::domain::{
    CommissionStructure, CostInputs, RateConfig, RepId, RepRateProfile, TargetPercentages,
};

pub(super) fn profit_split_rep(commission_percent: f64, overhead_percent: f64) -> RateConfig {
    RateConfig {
        overhead_percent,
        personal_overhead_percent: None,
        commission_percent,
        commission_structure: CommissionStructure::ProfitSplit,
    }
}

pub(super) fn sales_rep(commission_percent: f64, overhead_percent: f64) -> RateConfig {
    RateConfig {
        overhead_percent,
        personal_overhead_percent: None,
        commission_percent,
        commission_structure: CommissionStructure::SalesPercentage,
    }
}

pub(super) fn base_costs() -> CostInputs {
    CostInputs {
        material_base_cost: 4000.0,
        labor_base_cost: 2000.0,
        waste_factor_percent: 10.0,
        contingency_percent: 5.0,
        fixed_costs: 500.0,
        measured_area: 20.0,
    }
}

pub(super) fn targets(overhead_percent: f64, target_margin_percent: f64) -> TargetPercentages {
    TargetPercentages {
        overhead_percent,
        target_margin_percent,
    }
}

pub(super) fn profile(rep_id: &str) -> RepRateProfile {
    RepRateProfile {
        rep_id: RepId(rep_id.to_string()),
        overhead_percent: Some(10.0),
        personal_overhead_percent: None,
        commission_percent: Some(8.0),
        commission_structure: Some(CommissionStructure::ProfitSplit),
    }
}
