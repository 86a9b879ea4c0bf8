use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetClass {
    Equity,
    #[serde(alias = "fixedIncome", alias = "fixed_income")]
    FixedIncome,
    Property,
    Alternative,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Equity,
        AssetClass::FixedIncome,
        AssetClass::Property,
        AssetClass::Alternative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::FixedIncome => "fixed income",
            AssetClass::Property => "property",
            AssetClass::Alternative => "alternative",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorProfile {
    pub current_age: u32,
    pub retirement_age: u32,
    pub risk_tolerance: RiskTolerance,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrailingReturns {
    pub one_month: Option<f64>,
    pub three_month: Option<f64>,
    pub six_month: Option<f64>,
    pub one_year: Option<f64>,
    pub ytd: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub name: String,
    pub code: String,
    pub asset_class: AssetClass,
    pub value: f64,
    #[serde(default)]
    pub units: f64,
    pub allocation: f64,
    #[serde(default)]
    pub returns: TrailingReturns,
    #[serde(default = "default_risk_tier")]
    pub risk_tier: u8,
}

fn default_risk_tier() -> u8 {
    3
}

impl Fund {
    pub fn nav(&self) -> Option<f64> {
        if self.units > 0.0 {
            Some(self.value / self.units)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub fund_code: String,
    pub fund_name: String,
    pub value: f64,
    #[serde(default)]
    pub units: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub equity: f64,
    pub fixed_income: f64,
    pub property: f64,
    pub alternative: f64,
}

impl AssetAllocation {
    pub fn get(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::Equity => self.equity,
            AssetClass::FixedIncome => self.fixed_income,
            AssetClass::Property => self.property,
            AssetClass::Alternative => self.alternative,
        }
    }

    pub fn add(&mut self, class: AssetClass, percent: f64) {
        match class {
            AssetClass::Equity => self.equity += percent,
            AssetClass::FixedIncome => self.fixed_income += percent,
            AssetClass::Property => self.property += percent,
            AssetClass::Alternative => self.alternative += percent,
        }
    }

    pub fn total(&self) -> f64 {
        self.equity + self.fixed_income + self.property + self.alternative
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingRecommendation {
    pub fund_id: String,
    pub fund_name: String,
    pub asset_class: AssetClass,
    pub current_allocation: f64,
    pub target_allocation: f64,
    pub action: TradeAction,
    pub amount: f64,
    pub reason: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub total_adjustment: f64,
    pub risk_reduction: f64,
    pub expected_return_change: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    /// Annual return in percent, e.g. 7 for 7%.
    pub expected_return: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub age: u32,
    pub portfolio_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementPlan {
    pub inputs: RetirementInputs,
    pub projection: Vec<ProjectionPoint>,
    pub final_value: f64,
    pub target_retirement_fund: f64,
    pub readiness_score: u32,
    pub recommended_monthly_contribution: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    pub id: &'static str,
    pub name: &'static str,
    /// Annual fraction, e.g. 0.07.
    pub expected_return: f64,
    pub risk: RiskLevel,
    pub historical_returns: &'static [f64],
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardPoint {
    pub year: u32,
    pub value: f64,
    pub contributed: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestPoint {
    pub year: u32,
    pub return_percent: Option<f64>,
    pub value: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPoint {
    pub year: u32,
    pub age: u32,
    pub bear: f64,
    pub base: f64,
    pub bull: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSeries {
    pub volatility: f64,
    pub points: Vec<ScenarioPoint>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAction {
    pub fund_name: String,
    pub action: TradeSide,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingTransaction {
    pub id: String,
    pub timestamp: String,
    pub total_amount: f64,
    pub actions: Vec<TransactionAction>,
    pub status: TransactionStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSimulation {
    pub plan_id: &'static str,
    pub plan_name: &'static str,
    pub forward: Vec<ForwardPoint>,
    pub backtest: Vec<BacktestPoint>,
}
