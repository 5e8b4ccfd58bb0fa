use super::commission::{self, AllocationContext};
use super::distribution::{self, DistributionInputs};
use super::domain::{
    CostInputs, EngineError, EstimateBreakdown, RepAssignment, TargetPercentages,
};
use super::solver;

/// Run the full pricing pipeline: solve the selling price, allocate
/// commissions in the fixed order, distribute the line-item totals, and
/// assemble the breakdown.
///
/// Pure function with no ambient configuration: every rate the calculation
/// depends on arrives resolved in the arguments, so a breakdown can never be
/// computed against defaults that a later lookup would have corrected.
pub fn compute_breakdown(
    costs: &CostInputs,
    targets: &TargetPercentages,
    assignment: &RepAssignment,
) -> Result<EstimateBreakdown, EngineError> {
    let solution = solver::solve(costs, targets, assignment.sales_commission_percent())?;

    let allocation = commission::allocate(
        &AllocationContext {
            selling_price: solution.selling_price,
            overhead_amount: solution.overhead_amount,
            material_and_labor_cost: solution.adjusted_material + solution.adjusted_labor,
        },
        assignment,
    )?;

    let target_profit_amount = solution.selling_price * targets.target_margin_percent / 100.0;

    let totals = distribution::distribute(&DistributionInputs {
        selling_price: solution.selling_price,
        overhead_amount: solution.overhead_amount,
        total_commission_amount: allocation.primary_commission_amount
            + allocation.secondary_commission_amount,
        target_profit_amount,
        fixed_costs: costs.fixed_costs,
        adjusted_material: solution.adjusted_material,
        adjusted_labor: solution.adjusted_labor,
    });

    let price_per_unit_area = if costs.measured_area > 0.0 {
        solution.selling_price / costs.measured_area
    } else {
        0.0
    };

    Ok(EstimateBreakdown {
        selling_price: solution.selling_price,
        material_total: totals.material_total,
        labor_total: totals.labor_total,
        material_markup_percent: totals.material_markup_percent,
        labor_markup_percent: totals.labor_markup_percent,
        overhead_amount: solution.overhead_amount,
        primary_commission_amount: allocation.primary_commission_amount,
        secondary_commission_amount: allocation.secondary_commission_amount,
        target_profit_amount,
        company_net: allocation.company_net,
        price_per_unit_area,
    })
}
