use std::sync::Arc;

use estimator_ai::pricing::{
    compute_breakdown, CommissionStructure, ComplexityClass, CostInputs, CostTemplate,
    EngineError, EstimateRecomputeCoordinator, InMemoryEstimateRepository, InMemoryRateSource,
    NewEstimate, RateConfig, RegionZone, RepAssignment, RepId, RepRateProfile, Season,
    SplitShares, TargetPercentages,
};

fn rep(structure: CommissionStructure, commission_percent: f64) -> RateConfig {
    RateConfig {
        overhead_percent: 10.0,
        personal_overhead_percent: None,
        commission_percent,
        commission_structure: structure,
    }
}

fn costs() -> CostInputs {
    CostInputs {
        material_base_cost: 4000.0,
        labor_base_cost: 2000.0,
        waste_factor_percent: 10.0,
        contingency_percent: 5.0,
        fixed_costs: 500.0,
        measured_area: 20.0,
    }
}

fn targets(overhead_percent: f64, target_margin_percent: f64) -> TargetPercentages {
    TargetPercentages {
        overhead_percent,
        target_margin_percent,
    }
}

#[test]
fn overhead_round_trips_at_the_public_surface() {
    let assignment = RepAssignment::Single {
        primary: rep(CommissionStructure::SalesPercentage, 8.0),
    };
    let breakdown =
        compute_breakdown(&costs(), &targets(12.5, 22.0), &assignment).expect("prices");
    let rederived = breakdown.overhead_amount / breakdown.selling_price * 100.0;
    assert!((rederived - 12.5).abs() < 1e-6);
}

#[test]
fn breakdown_conserves_the_selling_price_to_the_cent() {
    let assignment = RepAssignment::Dual {
        primary: rep(CommissionStructure::ProfitSplit, 60.0),
        secondary: rep(CommissionStructure::SalesPercentage, 10.0),
    };
    let breakdown =
        compute_breakdown(&costs(), &targets(10.0, 20.0), &assignment).expect("prices");

    let resummed = breakdown.material_total
        + breakdown.labor_total
        + breakdown.overhead_amount
        + breakdown.primary_commission_amount
        + breakdown.secondary_commission_amount
        + breakdown.target_profit_amount
        + costs().fixed_costs;
    assert!((resummed - breakdown.selling_price).abs() <= 0.01);
}

#[test]
fn boundary_configurations_fail_closed_and_open() {
    let assignment = RepAssignment::Single {
        primary: rep(CommissionStructure::ProfitSplit, 50.0),
    };

    let err = compute_breakdown(&costs(), &targets(60.0, 40.0), &assignment)
        .expect_err("sum of exactly 100 has no finite price");
    assert!(matches!(err, EngineError::MarginConfiguration { .. }));

    let breakdown = compute_breakdown(&costs(), &targets(60.0, 39.999), &assignment)
        .expect("sum just under 100 solves");
    assert!(breakdown.selling_price.is_finite());
    assert!(breakdown.selling_price > 1_000_000.0);
}

#[test]
fn catalog_template_feeds_the_engine_directly() {
    let template = CostTemplate::standard();
    let costs = template.cost_inputs(
        24.0,
        ComplexityClass::Standard,
        Season::Shoulder,
        RegionZone::Suburban,
        600.0,
    );
    let assignment = RepAssignment::Single {
        primary: rep(CommissionStructure::SalesPercentage, 8.0),
    };

    let breakdown = compute_breakdown(&costs, &targets(10.0, 20.0), &assignment).expect("prices");
    assert!(breakdown.selling_price > 0.0);
    assert!(
        (breakdown.price_per_unit_area - breakdown.selling_price / 24.0).abs() < 1e-9
    );
}

#[test]
fn coordinator_keeps_a_persisted_estimate_consistent_across_rate_changes() {
    let repository = Arc::new(InMemoryEstimateRepository::new());
    let rates = Arc::new(InMemoryRateSource::from_profiles([RepRateProfile {
        rep_id: RepId("rep-1".to_string()),
        overhead_percent: Some(10.0),
        personal_overhead_percent: None,
        commission_percent: Some(8.0),
        commission_structure: Some(CommissionStructure::SalesPercentage),
    }]));
    let coordinator = EstimateRecomputeCoordinator::new(repository, rates);

    let record = coordinator
        .create(NewEstimate {
            costs: costs(),
            targets: targets(10.0, 20.0),
            primary_rep: RepId("rep-1".to_string()),
            secondary_rep: None,
            requested_split: None,
        })
        .expect("creates and prices");
    let first = record.breakdown.clone().expect("priced");

    // A rate edit with unchanged stored rates reprices to the same figures
    // under a new version: the breakdown is replaced, never merged.
    let record = coordinator
        .rates_changed(&record.estimate_id)
        .expect("reprices");
    let second = record.breakdown.expect("repriced");
    assert_eq!(second.version, first.version + 1);
    assert_eq!(second.breakdown, first.breakdown);
}

#[test]
fn split_shares_are_validated_never_normalized() {
    let err = RepAssignment::profit_split(
        rep(CommissionStructure::ProfitSplit, 50.0),
        rep(CommissionStructure::ProfitSplit, 50.0),
        SplitShares {
            primary_percent: 55.0,
            secondary_percent: 55.0,
        },
    )
    .expect_err("shares totaling 110 must fail");
    assert!(matches!(err, EngineError::SplitConfiguration { .. }));
}
