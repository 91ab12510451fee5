// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use paisa::application::{LedgerConfig, LedgerService, ManualClock};
use paisa::domain::{Amount, NewTransaction, TransactionKind};

/// Helper to create a seeded service with no latency and a clock the test controls
pub fn test_service() -> (LedgerService, Arc<ManualClock>) {
    test_service_with(LedgerConfig::instant())
}

pub fn test_service_with(config: LedgerConfig) -> (LedgerService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(parse_date("2024-06-01")));
    let service = LedgerService::with_clock(config, clock.clone());
    (service, clock)
}

/// Helper to parse a date string into DateTime<Utc> (09:00 on that day)
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn new_tx(kind: TransactionKind, amount: Amount) -> NewTransaction {
    NewTransaction::new(kind, amount, "INR", format!("test {}", kind))
}
