use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    AccountBalance, Amount, Beneficiary, FxQuote, NewBeneficiary, NewTransaction, Transaction,
    TransactionKind, TransactionMetadata, TransactionStatus,
};

use super::{Clock, LedgerConfig, LedgerError, SystemClock};

/// The wallet's single source of truth: balance, history and beneficiaries.
///
/// Cloning is cheap and every clone shares the same state. All mutations run
/// under one async mutex, so a sufficiency check and the debit that follows
/// it cannot interleave with another operation. Simulated latency is awaited
/// before the mutex is taken.
#[derive(Clone)]
pub struct LedgerService {
    state: Arc<Mutex<LedgerState>>,
    clock: Arc<dyn Clock>,
    config: Arc<LedgerConfig>,
}

/// Filter for querying the transaction history
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Case-insensitive match against description or id
    pub search: Option<String>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if transaction.kind != kind {
                return false;
            }
        }
        if let Some(status) = self.status {
            if transaction.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                transaction.description.to_lowercase().contains(&term)
                    || transaction.id.to_string().to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// Point-in-time copy of the whole ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub taken_at: DateTime<Utc>,
    pub balance: AccountBalance,
    pub transactions: Vec<Transaction>,
    pub beneficiaries: Vec<Beneficiary>,
}

struct LedgerState {
    account: AccountBalance,
    /// Newest first
    transactions: VecDeque<Transaction>,
    beneficiaries: Vec<Beneficiary>,
}

impl LedgerState {
    fn seeded(config: &LedgerConfig, now: DateTime<Utc>) -> Self {
        let currency = config.currency.clone();

        let opening = NewTransaction::new(
            TransactionKind::Deposit,
            config.opening_balance,
            currency.clone(),
            "Initial deposit from GBP",
        )
        .with_metadata(TransactionMetadata::DepositConversion {
            from_currency: "GBP".into(),
            from_amount: dec!(241.50),
            fx_rate: dec!(103.45),
            quote_issued_at: None,
        })
        .into_transaction(now - chrono::Duration::days(7));

        let interest = NewTransaction::new(
            TransactionKind::Interest,
            dec!(34.25),
            currency.clone(),
            "Daily interest accrual",
        )
        .into_transaction(now - chrono::Duration::days(1));

        let bill = NewTransaction::new(
            TransactionKind::BillPayment,
            dec!(1500),
            currency.clone(),
            "Electricity bill payment",
        )
        .with_metadata(TransactionMetadata::BillPayment {
            biller: "BSES Yamuna".into(),
            bill_reference: "BY123456789".into(),
        })
        .into_transaction(now - chrono::Duration::hours(2));

        let beneficiaries = vec![
            Beneficiary {
                id: "1".into(),
                name: "Rajesh Kumar".into(),
                account_number: "1234567890".into(),
                routing_code: "SBIN0001234".into(),
                bank_name: "State Bank of India".into(),
                verified: true,
            },
            Beneficiary {
                id: "2".into(),
                name: "Priya Sharma".into(),
                account_number: "0987654321".into(),
                routing_code: "HDFC0000987".into(),
                bank_name: "HDFC Bank".into(),
                verified: true,
            },
        ];

        Self {
            account: AccountBalance {
                balance: config.opening_balance,
                currency,
                annual_interest_rate_bps: config.annual_interest_rate_bps,
                last_accrual: now,
            },
            transactions: VecDeque::from(vec![bill, interest, opening]),
            beneficiaries,
        }
    }

    /// Stamp, prepend and apply the balance effect. No sufficiency check.
    /// State is untouched if the new balance would overflow.
    fn apply(
        &mut self,
        new: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let transaction = new.into_transaction(now);
        let balance = self
            .account
            .balance
            .checked_add(transaction.balance_effect())
            .ok_or_else(|| {
                LedgerError::InvalidAmount(format!(
                    "{} would overflow the balance",
                    transaction.amount
                ))
            })?;
        self.account.balance = balance;
        self.transactions.push_front(transaction.clone());
        Ok(transaction)
    }

    fn ensure_funds(&self, required: Amount) -> Result<(), LedgerError> {
        if required > self.account.balance {
            return Err(LedgerError::InsufficientBalance {
                balance: self.account.balance,
                required,
            });
        }
        Ok(())
    }

    /// Credit interest for every whole day since the last accrual.
    fn accrue_interest(&mut self, now: DateTime<Utc>) -> Option<Transaction> {
        let accrual = self.account.pending_accrual(now)?;

        if accrual.amount <= Amount::ZERO {
            self.account.last_accrual = now;
            debug!(days = accrual.days, "accrual period elapsed with nothing to credit");
            return None;
        }

        let plural = if accrual.days > 1 { "s" } else { "" };
        let new = NewTransaction::new(
            TransactionKind::Interest,
            accrual.amount,
            self.account.currency.clone(),
            format!("Interest accrual for {} day{}", accrual.days, plural),
        );
        let transaction = match self.apply(new, now) {
            Ok(transaction) => transaction,
            Err(err) => {
                warn!(days = accrual.days, "interest not credited: {}", err);
                return None;
            }
        };
        self.account.last_accrual = now;
        info!(
            days = accrual.days,
            amount = %accrual.amount,
            balance = %self.account.balance,
            "accrued interest"
        );
        Some(transaction)
    }
}

impl LedgerService {
    /// Create a seeded ledger on the system clock.
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a seeded ledger reading time from `clock`.
    pub fn with_clock(config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        let state = LedgerState::seeded(&config, clock.now());
        Self {
            state: Arc::new(Mutex::new(state)),
            clock,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Discard all changes and restore the seed data.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = LedgerState::seeded(&self.config, self.clock.now());
        info!("ledger reset to seed data");
    }

    async fn simulate_latency(&self, operation: &'static str, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        debug!(operation, delay_ms = delay.as_millis() as u64, "simulating latency");
        tokio::time::sleep(delay).await;
    }

    // ========================
    // Quotes
    // ========================

    /// Issue a conversion quote. Does not touch ledger state.
    pub async fn get_quote(&self, from: &str, to: &str) -> FxQuote {
        self.simulate_latency("get_quote", self.config.latency.quote).await;

        let quote = self
            .config
            .rates
            .quote(from, to, self.clock.now(), &mut rand::thread_rng());
        debug!(
            from = %quote.from_currency,
            to = %quote.to_currency,
            rate = %quote.rate,
            "issued quote"
        );
        quote
    }

    // ========================
    // Balance
    // ========================

    /// Current balance, after crediting any interest that has come due.
    pub async fn get_balance(&self) -> AccountBalance {
        self.simulate_latency("get_balance", self.config.latency.balance).await;

        let mut state = self.state.lock().await;
        state.accrue_interest(self.clock.now());
        state.account.clone()
    }

    // ========================
    // Transactions
    // ========================

    /// The `limit` most recent transactions, newest first.
    pub async fn list_transactions(&self, limit: usize) -> Vec<Transaction> {
        self.simulate_latency("list_transactions", self.config.latency.list_transactions).await;

        let state = self.state.lock().await;
        state.transactions.iter().take(limit).cloned().collect()
    }

    /// Transactions matching `filter`, newest first.
    pub async fn search_transactions(&self, filter: TransactionFilter) -> Vec<Transaction> {
        self.simulate_latency("search_transactions", self.config.latency.list_transactions).await;

        let state = self.state.lock().await;
        let matching = state.transactions.iter().filter(|t| filter.matches(t));
        match filter.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        }
    }

    /// Record a transaction and apply it to the balance.
    ///
    /// This is the low-level path: it never checks that a debit is covered.
    /// Use [`pay_bill`](Self::pay_bill) or [`transfer_to_bank`](Self::transfer_to_bank)
    /// for guarded debits. Fails only if the balance would overflow.
    pub async fn record_transaction(
        &self,
        new: NewTransaction,
    ) -> Result<Transaction, LedgerError> {
        self.simulate_latency("record_transaction", self.config.latency.record_transaction).await;

        let mut state = self.state.lock().await;
        let transaction = state.apply(new, self.clock.now())?;
        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            balance = %state.account.balance,
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// Credit the account by converting `foreign_amount` at a quoted rate.
    pub async fn fund_from_quote(
        &self,
        quote: &FxQuote,
        foreign_amount: Amount,
    ) -> Result<Transaction, LedgerError> {
        self.simulate_latency("fund_from_quote", self.config.latency.record_transaction).await;

        if foreign_amount <= Amount::ZERO {
            return Err(LedgerError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }
        if !quote.to_currency.eq_ignore_ascii_case(&self.config.currency) {
            return Err(LedgerError::CurrencyMismatch {
                expected: self.config.currency.clone(),
                actual: quote.to_currency.clone(),
            });
        }

        let now = self.clock.now();
        if quote.is_expired(now) {
            warn!(expired_at = %quote.expires_at, "rejected funding with expired quote");
            return Err(LedgerError::QuoteExpired {
                expired_at: quote.expires_at,
            });
        }

        let converted = quote.convert(foreign_amount).ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "{} {} is too large to convert",
                foreign_amount, quote.from_currency
            ))
        })?;

        let new = NewTransaction::new(
            TransactionKind::Deposit,
            converted,
            self.config.currency.clone(),
            format!("Fund transfer from {}", quote.from_currency),
        )
        .with_metadata(TransactionMetadata::DepositConversion {
            from_currency: quote.from_currency.clone(),
            from_amount: foreign_amount,
            fx_rate: quote.rate,
            quote_issued_at: Some(quote.issued_at),
        });

        let mut state = self.state.lock().await;
        let transaction = state.apply(new, now)?;
        info!(
            id = %transaction.id,
            from = %quote.from_currency,
            amount = %transaction.amount,
            balance = %state.account.balance,
            "funded account"
        );
        Ok(transaction)
    }

    // ========================
    // Beneficiaries
    // ========================

    pub async fn list_beneficiaries(&self) -> Vec<Beneficiary> {
        self.simulate_latency("list_beneficiaries", self.config.latency.list_beneficiaries).await;

        self.state.lock().await.beneficiaries.clone()
    }

    /// Save a new beneficiary. It always starts unverified.
    pub async fn add_beneficiary(&self, new: NewBeneficiary) -> Beneficiary {
        self.simulate_latency("add_beneficiary", self.config.latency.add_beneficiary).await;

        let beneficiary = new.into_beneficiary();
        self.state
            .lock()
            .await
            .beneficiaries
            .push(beneficiary.clone());
        info!(id = %beneficiary.id, name = %beneficiary.name, "added beneficiary");
        beneficiary
    }

    // ========================
    // Guarded debits
    // ========================

    /// Pay a bill from the account balance.
    pub async fn pay_bill(
        &self,
        biller_name: &str,
        bill_reference: &str,
        amount: Amount,
    ) -> Result<Transaction, LedgerError> {
        self.simulate_latency("pay_bill", self.config.latency.pay_bill).await;

        let mut state = self.state.lock().await;
        if let Err(err) = state.ensure_funds(amount) {
            warn!(biller = biller_name, %amount, "bill payment rejected: {}", err);
            return Err(err);
        }

        let new = NewTransaction::new(
            TransactionKind::BillPayment,
            amount,
            self.config.currency.clone(),
            format!("Bill payment to {}", biller_name),
        )
        .with_metadata(TransactionMetadata::BillPayment {
            biller: biller_name.to_string(),
            bill_reference: bill_reference.to_string(),
        });

        let transaction = state.apply(new, self.clock.now())?;
        info!(
            id = %transaction.id,
            biller = biller_name,
            amount = %amount,
            balance = %state.account.balance,
            "paid bill"
        );
        Ok(transaction)
    }

    /// Send money to a saved beneficiary. An empty description becomes
    /// "Transfer to {name}".
    pub async fn transfer_to_bank(
        &self,
        beneficiary_id: &str,
        amount: Amount,
        description: Option<&str>,
    ) -> Result<Transaction, LedgerError> {
        self.simulate_latency("transfer_to_bank", self.config.latency.transfer).await;

        let mut state = self.state.lock().await;
        if let Err(err) = state.ensure_funds(amount) {
            warn!(beneficiary_id, %amount, "transfer rejected: {}", err);
            return Err(err);
        }

        let beneficiary = state
            .beneficiaries
            .iter()
            .find(|b| b.id == beneficiary_id)
            .cloned()
            .ok_or_else(|| {
                warn!(beneficiary_id, "transfer rejected: unknown beneficiary");
                LedgerError::BeneficiaryNotFound(beneficiary_id.to_string())
            })?;

        let description = match description.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("Transfer to {}", beneficiary.name),
        };

        let new = NewTransaction::new(
            TransactionKind::Transfer,
            amount,
            self.config.currency.clone(),
            description,
        )
        .with_metadata(TransactionMetadata::BankTransfer {
            beneficiary_id: beneficiary.id.clone(),
            beneficiary_name: beneficiary.name.clone(),
            account_number: beneficiary.account_number.clone(),
            routing_code: beneficiary.routing_code.clone(),
        });

        let transaction = state.apply(new, self.clock.now())?;
        info!(
            id = %transaction.id,
            beneficiary = %beneficiary.name,
            amount = %amount,
            balance = %state.account.balance,
            "transferred to bank"
        );
        Ok(transaction)
    }

    // ========================
    // Snapshot
    // ========================

    /// Copy of the full state. No latency, no accrual.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock().await;
        LedgerSnapshot {
            taken_at: self.clock.now(),
            balance: state.account.clone(),
            transactions: state.transactions.iter().cloned().collect(),
            beneficiaries: state.beneficiaries.clone(),
        }
    }
}
