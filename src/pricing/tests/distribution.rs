use crate::pricing::distribution::{distribute, DistributionInputs};

fn inputs() -> DistributionInputs {
    DistributionInputs {
        selling_price: 10_000.0,
        overhead_amount: 1_000.0,
        total_commission_amount: 800.0,
        target_profit_amount: 1_200.0,
        fixed_costs: 500.0,
        adjusted_material: 4_400.0,
        adjusted_labor: 2_100.0,
    }
}

#[test]
fn totals_resum_to_the_selling_price() {
    let inputs = inputs();
    let totals = distribute(&inputs);
    let resummed = totals.material_total
        + totals.labor_total
        + inputs.overhead_amount
        + inputs.total_commission_amount
        + inputs.target_profit_amount
        + inputs.fixed_costs;
    assert!((resummed - inputs.selling_price).abs() <= 0.01);
}

#[test]
fn material_takes_its_base_weighted_share_and_labor_the_residual() {
    let inputs = inputs();
    let totals = distribute(&inputs);
    // available = 6500; material weight 4400/6500 of the base.
    let expected_material = 6_500.0 * 4_400.0 / 6_500.0;
    assert!((totals.material_total - expected_material).abs() < 1e-9);
    assert!((totals.labor_total - (6_500.0 - totals.material_total)).abs() < 1e-12);
}

#[test]
fn markup_percents_are_relative_to_adjusted_base() {
    let mut inputs = inputs();
    inputs.total_commission_amount = 0.0;
    inputs.target_profit_amount = 0.0;
    let totals = distribute(&inputs);
    // available 8500 over a 6500 base: ~30.8% markup on both lines.
    let expected = (8_500.0 / 6_500.0 - 1.0) * 100.0;
    assert!((totals.material_markup_percent - expected).abs() < 1e-9);
    assert!((totals.labor_markup_percent - expected).abs() < 1e-9);
}

#[test]
fn zero_base_weight_puts_the_residual_on_labor() {
    let inputs = DistributionInputs {
        selling_price: 1_000.0,
        overhead_amount: 100.0,
        total_commission_amount: 0.0,
        target_profit_amount: 200.0,
        fixed_costs: 0.0,
        adjusted_material: 0.0,
        adjusted_labor: 0.0,
    };
    let totals = distribute(&inputs);
    assert_eq!(totals.material_total, 0.0);
    assert!((totals.labor_total - 700.0).abs() < 1e-9);
    assert_eq!(totals.material_markup_percent, 0.0);
}
