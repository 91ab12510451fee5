use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::application::{HistorySummary, LedgerConfig, LedgerService, TransactionFilter};
use crate::domain::{
    Amount, FxQuote, NewBeneficiary, TransactionKind, TransactionStatus, default_billers,
    find_biller, format_currency, format_timestamp, parse_amount, validate_routing_code,
};
use crate::io::{Exporter, default_csv_filename};
use crate::storage::LocalCache;

/// Cache key for the most recent FX quote
const LAST_QUOTE_KEY: &str = "last_quote";

/// Paisa - simulated INR wallet
#[derive(Parser)]
#[command(name = "paisa")]
#[command(about = "A simulated INR wallet: FX funding, bill payments and bank transfers")]
#[command(version)]
pub struct Cli {
    /// Skip the simulated network latency
    #[arg(long, global = true)]
    pub instant: bool,

    /// Client-side cache file (remembers the last FX quote)
    #[arg(long, default_value = ".paisa-cache.json", global = true)]
    pub cache: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run (omit for the interactive shell)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// One line typed into the shell
#[derive(Parser)]
#[command(name = "paisa", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the account balance (credits any interest due)
    Balance,

    /// List recent transactions
    History {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Match against description or transaction id
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by kind: deposit, withdrawal, transfer, bill_payment, interest
        #[arg(short, long)]
        kind: Option<String>,

        /// Filter by status: pending, completed, failed
        #[arg(long)]
        status: Option<String>,
    },

    /// Get a live FX quote
    Quote {
        /// Currency to convert from (e.g., GBP, USD)
        from: String,

        /// Currency to convert to
        #[arg(long, default_value = "INR")]
        to: String,
    },

    /// Add money to the account from a foreign currency
    Fund {
        /// Amount in the foreign currency (e.g., "100" or "100.50")
        amount: String,

        /// Foreign currency code
        #[arg(long)]
        from: String,
    },

    /// List the billers that can be paid
    Billers,

    /// Pay a bill from the account balance
    PayBill {
        /// Biller id or name (e.g., "electricity")
        biller: String,

        /// Bill or consumer reference number
        reference: String,

        /// Amount to pay
        amount: String,
    },

    /// List saved beneficiaries
    Beneficiaries,

    /// Save a new bank beneficiary
    AddBeneficiary {
        /// Account holder name
        #[arg(long)]
        name: String,

        /// Bank account number
        #[arg(long)]
        account: String,

        /// Routing code (e.g., SBIN0001234)
        #[arg(long)]
        routing: String,

        /// Bank name
        #[arg(long)]
        bank: String,
    },

    /// Transfer money to a saved beneficiary
    Transfer {
        /// Beneficiary id (see `beneficiaries`)
        beneficiary: String,

        /// Amount to transfer
        amount: String,

        /// Description (defaults to "Transfer to <name>")
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Export transaction history
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write to paisa-transactions-<date>.csv in the current directory
        #[arg(long, conflicts_with = "output")]
        save: bool,
    },

    /// Discard changes and restore the demo data
    Reset,

    /// Start the interactive shell
    Shell,
}

/// Install the tracing subscriber. `RUST_LOG` wins over the verbose flag.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "paisa=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = if self.instant {
            LedgerConfig::instant()
        } else {
            LedgerConfig::default()
        };

        let session = Session {
            service: LedgerService::new(config),
            cache: LocalCache::new(self.cache),
        };

        match self.command {
            None | Some(Commands::Shell) => session.shell().await,
            Some(command) => session.execute(command).await,
        }
    }
}

/// A ledger and the client cache it is used with. The ledger lives only as
/// long as the session.
struct Session {
    service: LedgerService,
    cache: LocalCache,
}

impl Session {
    async fn shell(&self) -> Result<()> {
        println!("Paisa shell. Type 'help' for commands, 'exit' to quit.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("paisa> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            let args = match split_args(&line) {
                Ok(args) => args,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    continue;
                }
            };
            match args.first().map(String::as_str) {
                None => continue,
                Some("exit") | Some("quit") => break,
                Some(_) => {}
            }

            match ShellLine::try_parse_from(args) {
                Ok(ShellLine {
                    command: Commands::Shell,
                }) => println!("Already in the shell."),
                Ok(parsed) => {
                    if let Err(err) = self.execute(parsed.command).await {
                        eprintln!("Error: {:#}", err);
                    }
                }
                Err(err) => err.print()?,
            }
        }
        Ok(())
    }

    async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Balance => self.run_balance_command().await,
            Commands::History {
                limit,
                search,
                kind,
                status,
            } => self.run_history_command(limit, search, kind, status).await,
            Commands::Quote { from, to } => self.run_quote_command(&from, &to).await,
            Commands::Fund { amount, from } => self.run_fund_command(&amount, &from).await,
            Commands::Billers => {
                run_billers_command();
                Ok(())
            }
            Commands::PayBill {
                biller,
                reference,
                amount,
            } => self.run_pay_bill_command(&biller, &reference, &amount).await,
            Commands::Beneficiaries => self.run_beneficiaries_command().await,
            Commands::AddBeneficiary {
                name,
                account,
                routing,
                bank,
            } => {
                self.run_add_beneficiary_command(name, account, routing, bank)
                    .await
            }
            Commands::Transfer {
                beneficiary,
                amount,
                description,
            } => {
                self.run_transfer_command(&beneficiary, &amount, description)
                    .await
            }
            Commands::Export {
                format,
                output,
                save,
            } => self.run_export_command(&format, output, save).await,
            Commands::Reset => {
                self.service.reset().await;
                println!("Ledger restored to demo data.");
                Ok(())
            }
            Commands::Shell => Ok(()),
        }
    }

    async fn run_balance_command(&self) -> Result<()> {
        let account = self.service.get_balance().await;

        println!(
            "Balance:       {}",
            format_currency(account.balance, &account.currency)
        );
        println!("Interest rate: {}% p.a.", account.annual_rate_percent());
        println!("Last accrual:  {}", format_timestamp(account.last_accrual));
        Ok(())
    }

    async fn run_history_command(
        &self,
        limit: usize,
        search: Option<String>,
        kind: Option<String>,
        status: Option<String>,
    ) -> Result<()> {
        let kind = kind
            .map(|k| TransactionKind::from_str(&k).with_context(|| format!("Unknown kind '{}'", k)))
            .transpose()?;
        let status = status
            .map(|s| {
                TransactionStatus::from_str(&s).with_context(|| format!("Unknown status '{}'", s))
            })
            .transpose()?;

        let transactions = if search.is_none() && kind.is_none() && status.is_none() {
            self.service.list_transactions(limit).await
        } else {
            self.service
                .search_transactions(TransactionFilter {
                    search,
                    kind,
                    status,
                    limit: Some(limit),
                })
                .await
        };

        if transactions.is_empty() {
            println!("No transactions found.");
            return Ok(());
        }

        println!(
            "{:<22} {:<13} {:>14} {:<10} DESCRIPTION",
            "DATE", "TYPE", "AMOUNT", "STATUS"
        );
        println!("{}", "-".repeat(90));
        for tx in &transactions {
            let sign = if tx.kind.is_credit() { "+" } else { "-" };
            println!(
                "{:<22} {:<13} {:>14} {:<10} {}",
                format_timestamp(tx.created_at),
                tx.kind.as_str(),
                format!("{}{}", sign, format_currency(tx.amount, &tx.currency)),
                tx.status.as_str(),
                truncate(&tx.description, 30)
            );
        }

        let summary = HistorySummary::from_transactions(&transactions);
        println!("{}", "-".repeat(90));
        println!("{}", summary_line(&summary, &self.service.config().currency));
        Ok(())
    }

    async fn run_quote_command(&self, from: &str, to: &str) -> Result<()> {
        let quote = self.service.get_quote(from, to).await;
        self.cache.set(LAST_QUOTE_KEY, &quote);

        print_quote(&quote);
        Ok(())
    }

    async fn run_fund_command(&self, amount: &str, from: &str) -> Result<()> {
        let foreign_amount = parse_positive_amount(amount)?;
        let account_currency = self.service.config().currency.clone();

        let quote = match self.cached_quote(from, &account_currency) {
            Some(quote) => quote,
            None => {
                let quote = self.service.get_quote(from, &account_currency).await;
                self.cache.set(LAST_QUOTE_KEY, &quote);
                quote
            }
        };
        print_quote(&quote);

        let tx = self.service.fund_from_quote(&quote, foreign_amount).await?;
        println!(
            "Added {} to your account ({} {} at {}) ({})",
            format_currency(tx.amount, &tx.currency),
            foreign_amount,
            quote.from_currency,
            quote.rate,
            tx.id
        );
        Ok(())
    }

    /// The cached quote, if it converts the right pair and is still valid.
    fn cached_quote(&self, from: &str, to: &str) -> Option<FxQuote> {
        self.cache
            .get::<FxQuote>(LAST_QUOTE_KEY)
            .filter(|q| q.from_currency.eq_ignore_ascii_case(from))
            .filter(|q| q.to_currency.eq_ignore_ascii_case(to))
            .filter(|q| !q.is_expired(Utc::now()))
    }

    async fn run_pay_bill_command(
        &self,
        biller: &str,
        reference: &str,
        amount: &str,
    ) -> Result<()> {
        let amount = parse_positive_amount(amount)?;
        ensure!(!reference.trim().is_empty(), "Bill reference is required");

        let billers = default_billers();
        let biller_name = find_biller(&billers, biller)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| biller.to_string());

        let tx = self
            .service
            .pay_bill(&biller_name, reference.trim(), amount)
            .await?;
        println!(
            "Paid {} to {} ({})",
            format_currency(tx.amount, &tx.currency),
            biller_name,
            tx.id
        );
        Ok(())
    }

    async fn run_beneficiaries_command(&self) -> Result<()> {
        let beneficiaries = self.service.list_beneficiaries().await;

        if beneficiaries.is_empty() {
            println!("No beneficiaries saved.");
            return Ok(());
        }

        println!(
            "{:<38} {:<20} {:<14} {:<12} {:<22} VERIFIED",
            "ID", "NAME", "ACCOUNT", "ROUTING", "BANK"
        );
        println!("{}", "-".repeat(120));
        for b in &beneficiaries {
            println!(
                "{:<38} {:<20} {:<14} {:<12} {:<22} {}",
                b.id,
                truncate(&b.name, 20),
                b.account_number,
                b.routing_code,
                truncate(&b.bank_name, 22),
                if b.verified { "yes" } else { "pending" }
            );
        }
        Ok(())
    }

    async fn run_add_beneficiary_command(
        &self,
        name: String,
        account: String,
        routing: String,
        bank: String,
    ) -> Result<()> {
        let routing = routing.trim().to_uppercase();
        if !validate_routing_code(&routing) {
            bail!(
                "Invalid routing code '{}': expected 4 letters, '0', then 6 letters or digits",
                routing
            );
        }
        ensure!(!name.trim().is_empty(), "Beneficiary name is required");
        ensure!(!account.trim().is_empty(), "Account number is required");

        let beneficiary = self
            .service
            .add_beneficiary(NewBeneficiary::new(
                name.trim(),
                account.trim(),
                routing,
                bank.trim(),
            ))
            .await;
        println!(
            "Saved beneficiary: {} ({}), pending verification",
            beneficiary.name, beneficiary.id
        );
        Ok(())
    }

    async fn run_transfer_command(
        &self,
        beneficiary: &str,
        amount: &str,
        description: Option<String>,
    ) -> Result<()> {
        let amount = parse_positive_amount(amount)?;

        let tx = self
            .service
            .transfer_to_bank(beneficiary, amount, description.as_deref())
            .await?;
        println!(
            "Transferred {}: {} ({})",
            format_currency(tx.amount, &tx.currency),
            tx.description,
            tx.id
        );
        Ok(())
    }

    async fn run_export_command(
        &self,
        format: &str,
        output: Option<PathBuf>,
        save: bool,
    ) -> Result<()> {
        let output = if save {
            Some(PathBuf::from(default_csv_filename(Utc::now().date_naive())))
        } else {
            output
        };

        let writer: Box<dyn Write> = match &output {
            Some(path) => Box::new(
                std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?,
            ),
            None => Box::new(std::io::stdout()),
        };

        let exporter = Exporter::new(&self.service);
        match format {
            "csv" => {
                let count = exporter
                    .export_transactions_csv(writer, TransactionFilter::default())
                    .await?;
                if let Some(path) = &output {
                    eprintln!("Exported {} transaction(s) to {}", count, path.display());
                }
            }
            "json" => {
                let export = exporter.export_snapshot_json(writer).await?;
                if let Some(path) = &output {
                    eprintln!(
                        "Exported snapshot with {} transaction(s) to {}",
                        export.snapshot.transactions.len(),
                        path.display()
                    );
                }
            }
            other => bail!("Unknown export format '{}'. Use csv or json", other),
        }
        Ok(())
    }
}

fn run_billers_command() {
    println!("{:<14} {:<20} CATEGORY", "ID", "NAME");
    println!("{}", "-".repeat(50));
    for biller in default_billers() {
        println!("{:<14} {:<20} {}", biller.id, biller.name, biller.category);
    }
}

fn print_quote(quote: &FxQuote) {
    println!(
        "1 {} = {} {} (valid until {})",
        quote.from_currency,
        quote.rate,
        quote.to_currency,
        quote.expires_at.format("%I:%M:%S %p UTC")
    );
}

fn parse_positive_amount(input: &str) -> Result<Amount> {
    let amount = parse_amount(input).context("Invalid amount format. Use '50.00' or '50'")?;
    ensure!(amount > Amount::ZERO, "Amount must be positive");
    Ok(amount)
}

/// Footer under the history table. Credits and debits are shown apart.
fn summary_line(summary: &HistorySummary, currency: &str) -> String {
    format!(
        "{} transaction(s), {} completed, {} pending | in {}, out {}, net {}",
        summary.count,
        summary.completed,
        summary.pending,
        format_currency(summary.total_credited, currency),
        format_currency(summary.total_debited, currency),
        format_currency(summary.net(), currency)
    )
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Split a shell line into arguments, honouring single and double quotes.
fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_arg = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        bail!("Unterminated quote");
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}
