use super::types::{ProjectionPoint, RetirementInputs, RetirementPlan};

pub const MONTHLY_LIVING_EXPENSE: f64 = 30_000.0;
pub const LIFE_EXPECTANCY_AGE: u32 = 85;
pub const MAX_READINESS_SCORE: u32 = 100;
pub const MONTHS_PER_YEAR: u32 = 12;

pub fn project_retirement(inputs: &RetirementInputs) -> RetirementPlan {
    let years = inputs.retirement_age.saturating_sub(inputs.current_age);
    let monthly_return = monthly_rate(inputs.expected_return);

    let mut projection = Vec::with_capacity(years as usize + 1);
    let mut value = inputs.current_savings;
    projection.push(ProjectionPoint {
        age: inputs.current_age,
        portfolio_value: value,
    });
    for year in 1..=years {
        for _ in 0..MONTHS_PER_YEAR {
            value = value * (1.0 + monthly_return) + inputs.monthly_contribution;
        }
        projection.push(ProjectionPoint {
            age: inputs.current_age + year,
            portfolio_value: value,
        });
    }

    let target_retirement_fund = target_retirement_fund(inputs.retirement_age);
    RetirementPlan {
        inputs: *inputs,
        projection,
        final_value: value,
        target_retirement_fund,
        readiness_score: readiness_score(value, target_retirement_fund),
        recommended_monthly_contribution: required_monthly_contribution(
            inputs.current_savings,
            target_retirement_fund,
            monthly_return,
            years.saturating_mul(MONTHS_PER_YEAR),
        ),
    }
}

pub fn monthly_rate(annual_percent: f64) -> f64 {
    annual_percent / 100.0 / MONTHS_PER_YEAR as f64
}

/// Negative once retirement starts past `LIFE_EXPECTANCY_AGE`.
pub fn target_retirement_fund(retirement_age: u32) -> f64 {
    MONTHLY_LIVING_EXPENSE
        * MONTHS_PER_YEAR as f64
        * (LIFE_EXPECTANCY_AGE as f64 - retirement_age as f64)
}

/// A target of zero or less counts as fully funded.
pub fn readiness_score(final_value: f64, target: f64) -> u32 {
    if target <= 0.0 {
        return MAX_READINESS_SCORE;
    }
    let score = (final_value / target * 100.0).round();
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, MAX_READINESS_SCORE as f64) as u32
}

pub fn future_value_lump_sum(present: f64, rate: f64, periods: u32) -> f64 {
    present * growth_factor(rate, periods)
}

pub fn future_value_annuity(payment: f64, rate: f64, periods: u32) -> f64 {
    if rate == 0.0 {
        return payment * periods as f64;
    }
    payment * (growth_factor(rate, periods) - 1.0) / rate
}

// Period counts beyond i32::MAX are clamped.
fn growth_factor(rate: f64, periods: u32) -> f64 {
    (1.0 + rate).powi(i32::try_from(periods).unwrap_or(i32::MAX))
}

pub fn required_monthly_contribution(savings: f64, target: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    let gap = target - future_value_lump_sum(savings, rate, periods);
    if gap <= 0.0 {
        return 0.0;
    }
    let per_unit_payment = future_value_annuity(1.0, rate, periods);
    (gap / per_unit_payment).max(0.0)
}
