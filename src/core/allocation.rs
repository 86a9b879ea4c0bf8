use super::types::{AssetAllocation, AssetClass, Fund, Holding, InvestorProfile, RiskTolerance};

pub const AGE_RULE_BASE: f64 = 100.0;
pub const PROPERTY_RESERVE: f64 = 5.0;
pub const ALTERNATIVE_RESERVE: f64 = 5.0;
const CONSERVATIVE_EQUITY_CUT: f64 = 20.0;
const CONSERVATIVE_EQUITY_FLOOR: f64 = 20.0;
const AGGRESSIVE_EQUITY_BOOST: f64 = 10.0;
const AGGRESSIVE_EQUITY_CAP: f64 = 80.0;

pub const DEFAULT_ASSET_CLASS: AssetClass = AssetClass::Equity;
pub const DEFAULT_RISK_TIER: u8 = 3;

/// Age is not range-checked; very old profiles can push equity or fixed income
/// outside 0..=100.
pub fn target_allocation(profile: &InvestorProfile) -> AssetAllocation {
    let mut equity = AGE_RULE_BASE - profile.current_age as f64;
    match profile.risk_tolerance {
        RiskTolerance::Conservative => {
            equity = (equity - CONSERVATIVE_EQUITY_CUT).max(CONSERVATIVE_EQUITY_FLOOR);
        }
        RiskTolerance::Aggressive => {
            equity = (equity + AGGRESSIVE_EQUITY_BOOST).min(AGGRESSIVE_EQUITY_CAP);
        }
        RiskTolerance::Moderate => {}
    }

    AssetAllocation {
        equity,
        fixed_income: AGE_RULE_BASE - equity - (PROPERTY_RESERVE + ALTERNATIVE_RESERVE),
        property: PROPERTY_RESERVE,
        alternative: ALTERNATIVE_RESERVE,
    }
}

pub fn current_allocation(funds: &[Fund]) -> AssetAllocation {
    let mut allocation = AssetAllocation::default();
    for fund in funds {
        allocation.add(fund.asset_class, fund.allocation);
    }
    allocation
}

#[derive(Debug)]
pub struct ClassificationRule {
    pub patterns: &'static [&'static str],
    pub asset_class: AssetClass,
    pub risk_tier: u8,
}

// First match wins.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        patterns: &["PROP", "อสังหา"],
        asset_class: AssetClass::Property,
        risk_tier: 4,
    },
    ClassificationRule {
        patterns: &["ALT", "GOLD", "ทองคำ"],
        asset_class: AssetClass::Alternative,
        risk_tier: 5,
    },
    ClassificationRule {
        patterns: &["MIXED", "ผสม"],
        asset_class: AssetClass::Equity,
        risk_tier: 3,
    },
    ClassificationRule {
        patterns: &["MM", "ตลาดเงิน"],
        asset_class: AssetClass::FixedIncome,
        risk_tier: 1,
    },
    ClassificationRule {
        patterns: &["FI", "ตราสารหนี้"],
        asset_class: AssetClass::FixedIncome,
        risk_tier: 2,
    },
    ClassificationRule {
        patterns: &["EQ", "หุ้น"],
        asset_class: AssetClass::Equity,
        risk_tier: 4,
    },
];

pub fn classify_fund(code: &str, name: &str) -> (AssetClass, u8) {
    let code = code.to_uppercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| {
            rule.patterns
                .iter()
                .any(|pattern| code.contains(pattern) || name.contains(pattern))
        })
        .map(|rule| (rule.asset_class, rule.risk_tier))
        .unwrap_or((DEFAULT_ASSET_CLASS, DEFAULT_RISK_TIER))
}

pub fn funds_from_holdings(holdings: &[Holding]) -> (Vec<Fund>, f64) {
    let total: f64 = holdings.iter().map(|h| h.value).sum();
    let funds = holdings
        .iter()
        .map(|holding| {
            let (asset_class, risk_tier) = classify_fund(&holding.fund_code, &holding.fund_name);
            let allocation = if total > 0.0 {
                holding.value / total * 100.0
            } else {
                0.0
            };
            Fund {
                id: holding.fund_code.clone(),
                name: holding.fund_name.clone(),
                code: holding.fund_code.clone(),
                asset_class,
                value: holding.value,
                units: holding.units,
                allocation,
                returns: Default::default(),
                risk_tier,
            }
        })
        .collect();
    (funds, total)
}
