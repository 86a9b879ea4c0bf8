use chrono::{DateTime, SecondsFormat, Utc};

use super::types::{
    RebalancingRecommendation, RebalancingTransaction, TradeAction, TradeSide, TransactionAction,
    TransactionStatus,
};

pub fn build_transaction(
    recommendations: &[RebalancingRecommendation],
    id: String,
    executed_at: DateTime<Utc>,
) -> RebalancingTransaction {
    let actions: Vec<TransactionAction> = recommendations
        .iter()
        .filter_map(|rec| {
            let side = match rec.action {
                TradeAction::Buy => TradeSide::Buy,
                TradeAction::Sell => TradeSide::Sell,
                TradeAction::Hold => return None,
            };
            Some(TransactionAction {
                fund_name: rec.fund_name.clone(),
                action: side,
                amount: rec.amount,
            })
        })
        .collect();

    RebalancingTransaction {
        id,
        timestamp: executed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        total_amount: actions.iter().map(|a| a.amount).sum(),
        actions,
        status: TransactionStatus::Completed,
    }
}
