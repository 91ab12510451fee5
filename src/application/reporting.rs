use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Transaction, TransactionStatus};

/// Totals over a set of transactions, as shown under the history list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub count: usize,
    /// Sum of amounts regardless of direction
    pub total_amount: Amount,
    pub total_credited: Amount,
    pub total_debited: Amount,
    pub completed: usize,
    pub pending: usize,
    pub failed: usize,
}

impl HistorySummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(HistorySummary::default(), |mut summary, tx| {
                summary.count += 1;
                summary.total_amount = summary.total_amount.saturating_add(tx.amount);
                if tx.kind.is_credit() {
                    summary.total_credited = summary.total_credited.saturating_add(tx.amount);
                } else {
                    summary.total_debited = summary.total_debited.saturating_add(tx.amount);
                }
                match tx.status {
                    TransactionStatus::Completed => summary.completed += 1,
                    TransactionStatus::Pending => summary.pending += 1,
                    TransactionStatus::Failed => summary.failed += 1,
                }
                summary
            })
    }

    /// Credits minus debits
    pub fn net(&self) -> Amount {
        self.total_credited.saturating_sub(self.total_debited)
    }
}
