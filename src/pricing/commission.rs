use super::domain::{CommissionStructure, EngineError, RepAssignment};

/// Profit figures the allocator works from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationContext {
    pub selling_price: f64,
    pub overhead_amount: f64,
    /// Adjusted material plus adjusted labor; fixed costs are not part of the
    /// gross-profit base.
    pub material_and_labor_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionAllocation {
    pub gross_profit: f64,
    pub primary_commission_amount: f64,
    pub secondary_commission_amount: f64,
    pub company_net: f64,
}

/// Allocate commissions and company net in the fixed business order:
/// a percentage-of-contract secondary is deducted from gross profit before
/// any primary figure exists, then the primary (or the eligible split pool)
/// is paid, then the company keeps the remainder.
pub fn allocate(
    ctx: &AllocationContext,
    assignment: &RepAssignment,
) -> Result<CommissionAllocation, EngineError> {
    let gross_profit = ctx.selling_price - ctx.material_and_labor_cost - ctx.overhead_amount;

    let (profit_after_secondary, deducted_secondary) = match assignment.secondary() {
        Some(secondary)
            if secondary.commission_structure == CommissionStructure::SalesPercentage =>
        {
            let amount = ctx.selling_price * secondary.commission_percent / 100.0;
            (gross_profit - amount, amount)
        }
        _ => (gross_profit, 0.0),
    };

    let (primary_commission_amount, secondary_commission_amount) = match assignment {
        RepAssignment::ProfitSplit {
            primary,
            secondary,
            shares,
        } => {
            // Revalidated here so assignments deserialized or constructed
            // directly hit the same rules as the smart constructor.
            if secondary.commission_structure != CommissionStructure::ProfitSplit
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

            let pool = profit_after_secondary * primary.commission_percent / 100.0;
            (
                pool * shares.primary_percent / 100.0,
                pool * shares.secondary_percent / 100.0,
            )
        }
        RepAssignment::Single { primary } | RepAssignment::Dual { primary, .. } => {
            let primary_amount = match primary.commission_structure {
                CommissionStructure::ProfitSplit => {
                    (profit_after_secondary * primary.commission_percent / 100.0).max(0.0)
                }
                CommissionStructure::SalesPercentage => {
                    ctx.selling_price * primary.commission_percent / 100.0
                }
            };
            // A profit-split secondary earns only through the split-eligible
            // variant; outside it the deduction above is the whole secondary
            // payout.
            (primary_amount, deducted_secondary)
        }
    };

    // A percentage-of-contract secondary was already removed when forming
    // profit_after_secondary; only commissions not yet deducted come out here.
    let company_net = profit_after_secondary - primary_commission_amount
        - (secondary_commission_amount - deducted_secondary);

    Ok(CommissionAllocation {
        gross_profit,
        primary_commission_amount,
        secondary_commission_amount,
        company_net,
    })
}
