use super::projection::{MONTHS_PER_YEAR, future_value_annuity, future_value_lump_sum};
use super::types::{
    BacktestPoint, ForwardPoint, InvestmentPlan, PlanSimulation, RiskLevel, ScenarioPoint,
    ScenarioSeries,
};

pub const HIGH_RISK_VOLATILITY: f64 = 0.15;
pub const MEDIUM_RISK_VOLATILITY: f64 = 0.08;
pub const LOW_RISK_VOLATILITY: f64 = 0.03;

pub const PLANS: &[InvestmentPlan] = &[
    InvestmentPlan {
        id: "money-market",
        name: "Money Market Plan",
        expected_return: 0.015,
        risk: RiskLevel::Low,
        historical_returns: &[0.6, 0.4, 0.9, 1.8, 2.1],
    },
    InvestmentPlan {
        id: "fixed-income",
        name: "Fixed Income Plan",
        expected_return: 0.03,
        risk: RiskLevel::Low,
        historical_returns: &[2.4, 0.9, -0.6, 2.7, 3.1],
    },
    InvestmentPlan {
        id: "main",
        name: "Main Plan",
        expected_return: 0.045,
        risk: RiskLevel::Medium,
        historical_returns: &[1.7, 4.9, -1.9, 2.6, 4.3],
    },
    InvestmentPlan {
        id: "gold",
        name: "Gold Plan",
        expected_return: 0.05,
        risk: RiskLevel::Medium,
        historical_returns: &[21.6, -3.9, 3.2, 8.4, 27.3],
    },
    InvestmentPlan {
        id: "thai-equity",
        name: "Thai Equity Plan",
        expected_return: 0.07,
        risk: RiskLevel::High,
        historical_returns: &[-8.4, 15.2, 3.5, -12.1, -0.8],
    },
    InvestmentPlan {
        id: "foreign-equity",
        name: "Foreign Equity Plan",
        expected_return: 0.08,
        risk: RiskLevel::High,
        historical_returns: &[14.1, 22.3, -17.9, 19.6, 16.8],
    },
];

pub fn find_plan(id: &str) -> Option<&'static InvestmentPlan> {
    PLANS.iter().find(|plan| plan.id.eq_ignore_ascii_case(id))
}

pub fn volatility_for(risk: RiskLevel) -> f64 {
    match risk {
        RiskLevel::High => HIGH_RISK_VOLATILITY,
        RiskLevel::Medium => MEDIUM_RISK_VOLATILITY,
        RiskLevel::Low => LOW_RISK_VOLATILITY,
    }
}

pub fn forward_projection(
    initial: f64,
    monthly_contribution: f64,
    annual_return: f64,
    years: u32,
) -> Vec<ForwardPoint> {
    let rate = annual_return / MONTHS_PER_YEAR as f64;
    (0..=years)
        .map(|year| {
            let periods = year.saturating_mul(MONTHS_PER_YEAR);
            ForwardPoint {
                year,
                value: future_value_lump_sum(initial, rate, periods)
                    + future_value_annuity(monthly_contribution, rate, periods),
                contributed: initial + monthly_contribution * periods as f64,
            }
        })
        .collect()
}

/// Contributions for the year are added after that year's return is applied.
pub fn backtest(
    plan: &InvestmentPlan,
    initial: f64,
    monthly_contribution: f64,
) -> Vec<BacktestPoint> {
    let yearly_contribution = monthly_contribution * MONTHS_PER_YEAR as f64;
    let mut points = Vec::with_capacity(plan.historical_returns.len() + 1);
    let mut value = initial;
    points.push(BacktestPoint {
        year: 0,
        return_percent: None,
        value,
    });
    for (i, return_percent) in plan.historical_returns.iter().enumerate() {
        value = value * (1.0 + return_percent / 100.0) + yearly_contribution;
        points.push(BacktestPoint {
            year: i as u32 + 1,
            return_percent: Some(*return_percent),
            value,
        });
    }
    points
}

pub fn simulate_plans(
    plans: &[&'static InvestmentPlan],
    initial: f64,
    monthly_contribution: f64,
    years: u32,
) -> Vec<PlanSimulation> {
    plans
        .iter()
        .map(|plan| PlanSimulation {
            plan_id: plan.id,
            plan_name: plan.name,
            forward: forward_projection(initial, monthly_contribution, plan.expected_return, years),
            backtest: backtest(plan, initial, monthly_contribution),
        })
        .collect()
}

pub fn scenario_bands(
    start_age: u32,
    initial: f64,
    monthly_contribution: f64,
    expected_return: f64,
    risk: RiskLevel,
    years: u32,
) -> ScenarioSeries {
    let volatility = volatility_for(risk);
    let yearly_contribution = monthly_contribution * MONTHS_PER_YEAR as f64;

    let mut point = ScenarioPoint {
        year: 0,
        age: start_age,
        bear: initial,
        base: initial,
        bull: initial,
    };
    let mut points = Vec::with_capacity(years as usize + 1);
    points.push(point);
    for year in 1..=years {
        point = ScenarioPoint {
            year,
            age: start_age + year,
            bear: point.bear * (1.0 + expected_return - volatility) + yearly_contribution,
            base: point.base * (1.0 + expected_return) + yearly_contribution,
            bull: point.bull * (1.0 + expected_return + volatility) + yearly_contribution,
        };
        points.push(point);
    }

    ScenarioSeries { volatility, points }
}
