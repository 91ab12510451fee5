use std::time::Duration;

use rust_decimal_macros::dec;

use crate::domain::{ACCOUNT_CURRENCY, Amount, FxRateTable};

/// Simulated network delay per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyProfile {
    pub quote: Duration,
    pub balance: Duration,
    pub list_transactions: Duration,
    pub record_transaction: Duration,
    pub list_beneficiaries: Duration,
    pub add_beneficiary: Duration,
    pub pay_bill: Duration,
    pub transfer: Duration,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            quote: Duration::from_millis(1000),
            balance: Duration::from_millis(500),
            list_transactions: Duration::from_millis(300),
            record_transaction: Duration::from_millis(1000),
            list_beneficiaries: Duration::from_millis(300),
            add_beneficiary: Duration::from_millis(1000),
            pay_bill: Duration::from_millis(1500),
            transfer: Duration::from_millis(2000),
        }
    }
}

impl LatencyProfile {
    /// Every operation completes immediately.
    pub fn none() -> Self {
        Self {
            quote: Duration::ZERO,
            balance: Duration::ZERO,
            list_transactions: Duration::ZERO,
            record_transaction: Duration::ZERO,
            list_beneficiaries: Duration::ZERO,
            add_beneficiary: Duration::ZERO,
            pay_bill: Duration::ZERO,
            transfer: Duration::ZERO,
        }
    }
}

/// Construction parameters for a [`LedgerService`](super::LedgerService).
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub currency: String,
    pub opening_balance: Amount,
    /// 720 = 7.20% per year
    pub annual_interest_rate_bps: u32,
    pub latency: LatencyProfile,
    pub rates: FxRateTable,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: ACCOUNT_CURRENCY.to_string(),
            opening_balance: dec!(25000),
            annual_interest_rate_bps: 720,
            latency: LatencyProfile::default(),
            rates: FxRateTable::default(),
        }
    }
}

impl LedgerConfig {
    /// Default seed values with no simulated latency.
    pub fn instant() -> Self {
        Self::default().with_latency(LatencyProfile::none())
    }

    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_opening_balance(mut self, balance: Amount) -> Self {
        self.opening_balance = balance;
        self
    }

    pub fn with_interest_rate_bps(mut self, bps: u32) -> Self {
        self.annual_interest_rate_bps = bps;
        self
    }

    pub fn with_rates(mut self, rates: FxRateTable) -> Self {
        self.rates = rates;
        self
    }
}
