use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{LedgerService, LedgerSnapshot, TransactionFilter};
use crate::domain::{Transaction, format_plain, format_timestamp};

/// Versioned wrapper around a ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotExport {
    pub version: String,
    #[serde(flatten)]
    pub snapshot: LedgerSnapshot,
}

/// Exporter for writing ledger data out as CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the transactions matching `filter` to CSV
    pub async fn export_transactions_csv<W: Write>(
        &self,
        writer: W,
        filter: TransactionFilter,
    ) -> Result<usize> {
        let transactions = self.service.search_transactions(filter).await;
        write_transactions_csv(writer, &transactions)
    }

    /// Export the whole ledger as a JSON snapshot
    pub async fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<SnapshotExport> {
        let export = SnapshotExport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            snapshot: self.service.snapshot().await,
        };

        let json = serde_json::to_string_pretty(&export)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(export)
    }
}

/// Write transactions as fully quoted CSV, one row per transaction.
pub fn write_transactions_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record([
        "Date",
        "Type",
        "Description",
        "Amount (INR)",
        "Status",
        "Transaction ID",
    ])?;

    for tx in transactions {
        csv_writer.write_record([
            format_timestamp(tx.created_at),
            tx.kind.label(),
            tx.description.clone(),
            format_plain(tx.amount),
            tx.status.as_str().to_uppercase(),
            tx.id.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(transactions.len())
}

/// Example: 2024-01-15 -> "paisa-transactions-2024-01-15.csv"
pub fn default_csv_filename(date: NaiveDate) -> String {
    format!("paisa-transactions-{}.csv", date.format("%Y-%m-%d"))
}
