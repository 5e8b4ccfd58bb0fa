use crate::pricing::domain::EngineError;
use crate::pricing::solver::solve;

use super::common::{base_costs, targets};

#[test]
fn adjusts_base_costs_for_waste_and_contingency() {
    let solution = solve(&base_costs(), &targets(10.0, 20.0), 0.0).expect("solvable");
    assert!((solution.adjusted_material - 4400.0).abs() < 1e-9);
    assert!((solution.adjusted_labor - 2100.0).abs() < 1e-9);
    assert!((solution.total_base_cost - 7000.0).abs() < 1e-9);
    // 7000 / (1 - 0.30)
    assert!((solution.selling_price - 10_000.0).abs() < 1e-9);
}

#[test]
fn overhead_percent_round_trips_through_amounts() {
    for overhead in [0.0, 5.0, 10.0, 17.5, 33.0] {
        for margin in [0.0, 10.0, 22.5, 40.0] {
            let solution =
                solve(&base_costs(), &targets(overhead, margin), 0.0).expect("valid percentages");
            let rederived = solution.overhead_amount / solution.selling_price * 100.0;
            assert!(
                (rederived - overhead).abs() < 1e-6,
                "overhead {overhead} re-derived as {rederived}"
            );
        }
    }
}

#[test]
fn commission_percent_joins_the_percentage_sum() {
    let plain = solve(&base_costs(), &targets(10.0, 20.0), 0.0).expect("solvable");
    let with_commission = solve(&base_costs(), &targets(10.0, 20.0), 10.0).expect("solvable");
    assert!(with_commission.selling_price > plain.selling_price);
    // 7000 / (1 - 0.40)
    assert!((with_commission.selling_price - 11_666.666_666_666_666).abs() < 1e-6);
}

#[test]
fn percentage_sum_of_one_hundred_is_rejected_before_division() {
    let err = solve(&base_costs(), &targets(60.0, 40.0), 0.0)
        .expect_err("full percentage sum leaves nothing for costs");
    assert_eq!(
        err,
        EngineError::MarginConfiguration {
            total_percent: 100.0
        }
    );
}

#[test]
fn near_boundary_sum_still_solves_finite() {
    let solution =
        solve(&base_costs(), &targets(60.0, 39.999), 0.0).expect("sum below 100 is solvable");
    assert!(solution.selling_price.is_finite());
    assert!(solution.selling_price > 1_000_000.0);
}

#[test]
fn negative_cost_is_a_typed_error() {
    let mut costs = base_costs();
    costs.labor_base_cost = -1.0;
    let err = solve(&costs, &targets(10.0, 20.0), 0.0).expect_err("negative labor cost");
    assert_eq!(
        err,
        EngineError::NegativeCost {
            field: "labor_base_cost",
            value: -1.0
        }
    );
}
