mod allocation;
mod projection;
mod rebalance;
mod scenario;
mod transaction;
mod types;

pub use allocation::{
    CLASSIFICATION_RULES, ClassificationRule, classify_fund, current_allocation,
    funds_from_holdings, target_allocation,
};
pub use projection::{
    LIFE_EXPECTANCY_AGE, MONTHLY_LIVING_EXPENSE, future_value_annuity, future_value_lump_sum,
    monthly_rate, project_retirement, readiness_score, required_monthly_contribution,
    target_retirement_fund,
};
pub use rebalance::{DRIFT_THRESHOLD, recommend_rebalancing, summarize_impact};
pub use scenario::{
    PLANS, backtest, find_plan, forward_projection, scenario_bands, simulate_plans,
    volatility_for,
};
pub use transaction::build_transaction;
pub use types::{
    AssetAllocation, AssetClass, BacktestPoint, ForwardPoint, Fund, Holding, ImpactSummary,
    InvestmentPlan, InvestorProfile, PlanSimulation, ProjectionPoint, RebalancingRecommendation,
    RebalancingTransaction, RetirementInputs, RetirementPlan, RiskLevel, RiskTolerance,
    ScenarioPoint, ScenarioSeries, TradeAction, TradeSide, TrailingReturns, TransactionAction,
    TransactionStatus,
};
