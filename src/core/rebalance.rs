use super::allocation::{current_allocation, target_allocation};
use super::types::{
    AssetAllocation, Fund, ImpactSummary, InvestorProfile, RebalancingRecommendation, TradeAction,
};

/// Percentage points of drift tolerated before a fund is traded.
pub const DRIFT_THRESHOLD: f64 = 2.0;
const RISK_REDUCTION_PER_SELL: f64 = 0.5;
const RETURN_CHANGE_PER_TRADE: f64 = 0.1;

/// Funds that share an asset class split that class's target equally, whatever their
/// size. Funds within `DRIFT_THRESHOLD` are left out.
pub fn recommend_rebalancing(
    funds: &[Fund],
    total_value: f64,
    profile: &InvestorProfile,
) -> Vec<RebalancingRecommendation> {
    let target = target_allocation(profile);
    let current = current_allocation(funds);

    let mut recommendations: Vec<RebalancingRecommendation> = funds
        .iter()
        .filter_map(|fund| {
            let peers = funds
                .iter()
                .filter(|other| other.asset_class == fund.asset_class)
                .count();
            let proportional_target = target.get(fund.asset_class) / peers as f64;
            evaluate_fund(fund, proportional_target, total_value, &target, &current)
        })
        .collect();

    recommendations.sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs()));
    recommendations
}

fn evaluate_fund(
    fund: &Fund,
    proportional_target: f64,
    total_value: f64,
    target: &AssetAllocation,
    current: &AssetAllocation,
) -> Option<RebalancingRecommendation> {
    let diff = proportional_target - fund.allocation;
    if diff.abs() <= DRIFT_THRESHOLD {
        return None;
    }

    let class = fund.asset_class;
    let (action, direction) = if diff > 0.0 {
        (TradeAction::Buy, "underweight")
    } else {
        (TradeAction::Sell, "overweight")
    };
    let reason = format!(
        "{} is {direction}: holds {:.1}% against a {:.1}% target ({} overall {:.1}% vs {:.1}%)",
        fund.name,
        fund.allocation,
        proportional_target,
        class.label(),
        current.get(class),
        target.get(class),
    );

    Some(RebalancingRecommendation {
        fund_id: fund.id.clone(),
        fund_name: fund.name.clone(),
        asset_class: class,
        current_allocation: fund.allocation,
        target_allocation: proportional_target,
        action,
        amount: diff.abs() / 100.0 * total_value,
        reason,
    })
}

pub fn summarize_impact(recommendations: &[RebalancingRecommendation]) -> ImpactSummary {
    let mut summary = ImpactSummary::default();
    for rec in recommendations {
        summary.total_adjustment += rec.amount.abs();
        match rec.action {
            TradeAction::Buy => summary.expected_return_change += RETURN_CHANGE_PER_TRADE,
            TradeAction::Sell => {
                summary.risk_reduction += RISK_REDUCTION_PER_SELL;
                summary.expected_return_change -= RETURN_CHANGE_PER_TRADE;
            }
            TradeAction::Hold => {}
        }
    }
    summary
}
