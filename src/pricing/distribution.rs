/// Customer-facing line-item totals derived from a solved price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineItemTotals {
    pub material_total: f64,
    pub labor_total: f64,
    pub material_markup_percent: f64,
    pub labor_markup_percent: f64,
}

/// Inputs already produced by the solver and allocator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionInputs {
    pub selling_price: f64,
    pub overhead_amount: f64,
    pub total_commission_amount: f64,
    pub target_profit_amount: f64,
    pub fixed_costs: f64,
    pub adjusted_material: f64,
    pub adjusted_labor: f64,
}

/// Spread whatever the price does not owe to overhead, commissions, target
/// profit, and fixed costs across the material and labor lines.
///
/// Material takes its base-cost-weighted share; labor takes the residual, so
/// the re-summed breakdown always lands back on the selling price instead of
/// drifting by a rounding step.
pub fn distribute(inputs: &DistributionInputs) -> LineItemTotals {
    let available = inputs.selling_price
        - inputs.overhead_amount
        - inputs.total_commission_amount
        - inputs.target_profit_amount
        - inputs.fixed_costs;

    let base_weight = inputs.adjusted_material + inputs.adjusted_labor;
    let material_total = if base_weight > 0.0 {
        available * inputs.adjusted_material / base_weight
    } else {
        0.0
    };
    let labor_total = available - material_total;

    LineItemTotals {
        material_total,
        labor_total,
        material_markup_percent: markup_percent(material_total, inputs.adjusted_material),
        labor_markup_percent: markup_percent(labor_total, inputs.adjusted_labor),
    }
}

fn markup_percent(total: f64, base: f64) -> f64 {
    if base > 0.0 {
        (total / base - 1.0) * 100.0
    } else {
        0.0
    }
}
