use crate::pricing::domain::{EngineError, EstimateBreakdown, RepAssignment, SplitShares};
use crate::pricing::engine::compute_breakdown;

use super::common::{base_costs, profit_split_rep, sales_rep, targets};

fn resummed(breakdown: &EstimateBreakdown) -> f64 {
    breakdown.material_total
        + breakdown.labor_total
        + breakdown.overhead_amount
        + breakdown.primary_commission_amount
        + breakdown.secondary_commission_amount
        + breakdown.target_profit_amount
        + base_costs().fixed_costs
}

#[test]
fn breakdown_components_conserve_the_selling_price() {
    let assignments = [
        RepAssignment::Single {
            primary: sales_rep(8.0, 10.0),
        },
        RepAssignment::Single {
            primary: profit_split_rep(60.0, 10.0),
        },
        RepAssignment::Dual {
            primary: profit_split_rep(60.0, 10.0),
            secondary: sales_rep(10.0, 10.0),
        },
        RepAssignment::profit_split(
            profit_split_rep(50.0, 10.0),
            profit_split_rep(50.0, 10.0),
            SplitShares {
                primary_percent: 70.0,
                secondary_percent: 30.0,
            },
        )
        .expect("eligible split"),
    ];

    for assignment in assignments {
        let breakdown = compute_breakdown(&base_costs(), &targets(10.0, 20.0), &assignment)
            .expect("valid inputs price");
        assert!(
            (resummed(&breakdown) - breakdown.selling_price).abs() <= 0.01,
            "components drifted from the price for {assignment:?}"
        );
    }
}

#[test]
fn identical_inputs_yield_bit_identical_breakdowns() {
    let assignment = RepAssignment::Dual {
        primary: profit_split_rep(60.0, 10.0),
        secondary: sales_rep(10.0, 10.0),
    };
    let first = compute_breakdown(&base_costs(), &targets(10.0, 20.0), &assignment)
        .expect("prices");
    let second = compute_breakdown(&base_costs(), &targets(10.0, 20.0), &assignment)
        .expect("prices");
    assert_eq!(first, second);
    assert_eq!(
        first.selling_price.to_bits(),
        second.selling_price.to_bits()
    );
    assert_eq!(first.company_net.to_bits(), second.company_net.to_bits());
}

#[test]
fn sales_commission_counts_toward_the_margin_ceiling() {
    let assignment = RepAssignment::Single {
        primary: sales_rep(10.0, 60.0),
    };
    // 60 + 30 + 10 = 100: unsolvable even though overhead + margin alone fit.
    let err = compute_breakdown(&base_costs(), &targets(60.0, 30.0), &assignment)
        .expect_err("commission pushes the sum to 100");
    assert_eq!(
        err,
        EngineError::MarginConfiguration {
            total_percent: 100.0
        }
    );
}

#[test]
fn price_per_unit_area_comes_from_the_measured_area() {
    let assignment = RepAssignment::Single {
        primary: sales_rep(0.0, 10.0),
    };
    let breakdown = compute_breakdown(&base_costs(), &targets(10.0, 20.0), &assignment)
        .expect("prices");
    assert!(
        (breakdown.price_per_unit_area - breakdown.selling_price / 20.0).abs() < 1e-9
    );

    let mut costs = base_costs();
    costs.measured_area = 0.0;
    let breakdown = compute_breakdown(&costs, &targets(10.0, 20.0), &assignment).expect("prices");
    assert_eq!(breakdown.price_per_unit_area, 0.0);
}

#[test]
fn target_profit_holds_as_a_fraction_of_the_solved_price() {
    let assignment = RepAssignment::Single {
        primary: sales_rep(8.0, 10.0),
    };
    let breakdown = compute_breakdown(&base_costs(), &targets(10.0, 25.0), &assignment)
        .expect("prices");
    let rederived = breakdown.target_profit_amount / breakdown.selling_price * 100.0;
    assert!((rederived - 25.0).abs() < 1e-6);
}
