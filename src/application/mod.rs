// Application layer - the ledger store and what is built around it:
// - LedgerService: balance, history, beneficiaries, quotes
// - Clock: injectable time source for accrual and quote expiry
// - LedgerConfig: seed values and simulated latency
// - HistorySummary: totals over a slice of history

mod clock;
mod config;
pub mod error;
pub mod reporting;
mod service;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
