use super::domain::{CostInputs, EngineError, TargetPercentages};

/// Output of the reverse price solve: the price at which every percentage
/// target holds exactly as a fraction of the price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginSolution {
    pub selling_price: f64,
    pub overhead_amount: f64,
    pub adjusted_material: f64,
    pub adjusted_labor: f64,
    pub total_base_cost: f64,
}

/// Solve for the selling price that makes overhead, target margin, and any
/// price-fraction commissions hold exactly.
///
/// `sales_commission_percent` is the caller-assembled sum of the
/// percentage-of-contract commissions; profit-split commissions are not price
/// fractions and stay out of the solve.
pub fn solve(
    costs: &CostInputs,
    percentages: &TargetPercentages,
    sales_commission_percent: f64,
) -> Result<MarginSolution, EngineError> {
    costs.validate()?;

    let adjusted_material = costs.material_base_cost * (1.0 + costs.waste_factor_percent / 100.0);
    let adjusted_labor = costs.labor_base_cost * (1.0 + costs.contingency_percent / 100.0);
    let total_base_cost = adjusted_material + adjusted_labor + costs.fixed_costs;

    let total_percent =
        percentages.overhead_percent + percentages.target_margin_percent + sales_commission_percent;
    let sum_pct = total_percent / 100.0;

    // Validated before the division so an impossible configuration is a typed
    // error, not an infinite or negative price discovered downstream.
    if sum_pct >= 1.0 {
        return Err(EngineError::MarginConfiguration { total_percent });
    }

    let selling_price = total_base_cost / (1.0 - sum_pct);
    let overhead_amount = selling_price * percentages.overhead_percent / 100.0;

    Ok(MarginSolution {
        selling_price,
        overhead_amount,
        adjusted_material,
        adjusted_labor,
        total_base_cost,
    })
}
