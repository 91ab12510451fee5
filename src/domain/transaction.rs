use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money entering the account (e.g. funded from a foreign currency)
    Deposit,
    Withdrawal,
    /// Outgoing bank transfer to a saved beneficiary
    Transfer,
    BillPayment,
    /// Interest credited by daily accrual
    Interest,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Transfer => "transfer",
            TransactionKind::BillPayment => "bill_payment",
            TransactionKind::Interest => "interest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            "transfer" => Some(TransactionKind::Transfer),
            "bill_payment" => Some(TransactionKind::BillPayment),
            "interest" => Some(TransactionKind::Interest),
            _ => None,
        }
    }

    /// Deposits and interest add to the balance; everything else takes from it.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::Interest)
    }

    /// Human label used in exports, e.g. "BILL PAYMENT".
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Details captured when a transaction is created. Values are copied,
/// not referenced: a transfer keeps the beneficiary's details as they were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionMetadata {
    BillPayment {
        biller: String,
        bill_reference: String,
    },
    BankTransfer {
        beneficiary_id: String,
        beneficiary_name: String,
        account_number: String,
        routing_code: String,
    },
    DepositConversion {
        from_currency: String,
        from_amount: Amount,
        fx_rate: Amount,
        quote_issued_at: Option<DateTime<Utc>>,
    },
}

/// A single entry in the account history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Always positive; direction comes from `kind`
    pub amount: Amount,
    pub currency: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub metadata: Option<TransactionMetadata>,
}

impl Transaction {
    /// Signed effect on the account balance.
    pub fn balance_effect(&self) -> Amount {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// A transaction before the ledger has assigned it an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Amount,
    pub currency: String,
    pub description: String,
    pub status: TransactionStatus,
    pub metadata: Option<TransactionMetadata>,
}

impl NewTransaction {
    /// A completed transaction with no metadata.
    pub fn new(
        kind: TransactionKind,
        amount: Amount,
        currency: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            currency: currency.into(),
            description: description.into(),
            status: TransactionStatus::Completed,
            metadata: None,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_metadata(mut self, metadata: TransactionMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Assign identity. The id is a random v4 UUID.
    pub fn into_transaction(self, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            kind: self.kind,
            amount: self.amount,
            currency: self.currency,
            description: self.description,
            created_at,
            status: self.status,
            metadata: self.metadata,
        }
    }
}
