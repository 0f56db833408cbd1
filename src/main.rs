use clap::{Parser, Subcommand};
use feeledger::application::allocation::allocate;
use feeledger::application::workflow::{PaymentRequest, PaymentWorkflow};
use feeledger::domain::money::Balance;
use feeledger::domain::ports::{ScheduleCatalogBox, TransactionStoreBox};
use feeledger::domain::schedule::{CategoryKind, FeeCatalog, FeeCategory, FeeSchedule};
use feeledger::domain::transaction::{CategoryTag, PaymentMode, Transaction};
use feeledger::infrastructure::in_memory::InMemoryTransactionStore;
use feeledger::interfaces::csv::report_writer::ReportWriter;
use feeledger::interfaces::csv::transaction_reader::TransactionReader;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the per-category allocation report for a student
    Report {
        /// Transactions CSV export
        input: PathBuf,

        /// Student id
        #[arg(long)]
        student: u32,

        /// Class id used to look up the fee schedule
        #[arg(long)]
        class: String,

        /// Fee catalog JSON file (defaults to the built-in catalog)
        #[arg(long)]
        schedule: Option<PathBuf>,
    },
    /// Record a payment: preview, confirm, print the receipt and the
    /// updated allocation
    Collect {
        /// Student id
        #[arg(long)]
        student: u32,

        /// Admission number, used for the provisional receipt
        #[arg(long)]
        admission: String,

        /// Class id used to look up the fee schedule
        #[arg(long)]
        class: String,

        /// What the payment is for (tuition, materials, full, custom)
        #[arg(long, value_parser = parse_tag)]
        category: CategoryTag,

        /// Amount collected
        #[arg(long)]
        amount: Decimal,

        /// Payment mode (cash, upi, cheque, banktransfer)
        #[arg(long, value_parser = parse_mode, default_value = "cash")]
        mode: PaymentMode,

        /// Existing transactions CSV to replay before collecting
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Fee catalog JSON file (defaults to the built-in catalog)
        #[arg(long)]
        schedule: Option<PathBuf>,
    },
}

fn parse_tag(s: &str) -> std::result::Result<CategoryTag, String> {
    match s {
        "tuition" => Ok(CategoryTag::Tuition),
        "materials" => Ok(CategoryTag::Materials),
        "full" => Ok(CategoryTag::Full),
        "custom" => Ok(CategoryTag::Custom),
        other => Err(format!(
            "unknown category '{other}' (expected tuition, materials, full or custom)"
        )),
    }
}

fn parse_mode(s: &str) -> std::result::Result<PaymentMode, String> {
    match s {
        "cash" => Ok(PaymentMode::Cash),
        "upi" => Ok(PaymentMode::Upi),
        "cheque" => Ok(PaymentMode::Cheque),
        "banktransfer" => Ok(PaymentMode::BankTransfer),
        other => Err(format!(
            "unknown payment mode '{other}' (expected cash, upi, cheque or banktransfer)"
        )),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<ScheduleCatalogBox> {
    let catalog = match path {
        Some(path) => FeeCatalog::from_json_file(path).into_diagnostic()?,
        None => builtin_catalog()?,
    };
    Ok(Box::new(catalog))
}

fn builtin_catalog() -> Result<FeeCatalog> {
    let default = FeeSchedule::new(vec![
        FeeCategory::new(CategoryKind::Tuition, Balance::new(dec!(20000))).into_diagnostic()?,
        FeeCategory::new(CategoryKind::Materials, Balance::new(dec!(6500))).into_diagnostic()?,
    ])
    .into_diagnostic()?;
    FeeCatalog::new(HashMap::new(), default).into_diagnostic()
}

fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).into_diagnostic()?;
    let mut transactions = Vec::new();
    for result in TransactionReader::new(file).transactions() {
        match result {
            Ok(tx) => transactions.push(tx),
            Err(e) => eprintln!("Skipping unreadable row: {e}"),
        }
    }
    Ok(transactions)
}

fn print_report(schedule: &FeeSchedule, transactions: &[Transaction]) -> Result<()> {
    let results = allocate(schedule, transactions);
    let stdout = io::stdout();
    ReportWriter::new(stdout.lock())
        .write_report(&results)
        .into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Report {
            input,
            student,
            class,
            schedule,
        } => {
            let catalog = load_catalog(schedule.as_deref())?;
            let transactions: Vec<Transaction> = read_transactions(&input)?
                .into_iter()
                .filter(|tx| tx.student == student)
                .collect();
            print_report(&catalog.lookup(&class), &transactions)
        }
        Command::Collect {
            student,
            admission,
            class,
            category,
            amount,
            mode,
            input,
            db_path,
            schedule,
        } => {
            let catalog = load_catalog(schedule.as_deref())?;

            let (store, listing): (TransactionStoreBox, TransactionStoreBox) =
                if let Some(db_path) = db_path {
                    open_persistent(&db_path)?
                } else {
                    let store = InMemoryTransactionStore::new();
                    if let Some(input) = &input {
                        store.load(read_transactions(input)?).await;
                    }
                    (Box::new(store.clone()), Box::new(store))
                };

            let workflow = PaymentWorkflow::new(store);
            let draft = workflow
                .preview(PaymentRequest {
                    student,
                    admission_no: admission,
                    tag: category,
                    amount,
                    mode,
                })
                .into_diagnostic()?;
            println!("Preview receipt: {}", draft.provisional);

            let tx = workflow.confirm().await.into_diagnostic()?;
            println!("Recorded receipt: {}", tx.receipt);

            let transactions = listing.list_for_student(student).await.into_diagnostic()?;
            print_report(&catalog.lookup(&class), &transactions)
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent(path: &Path) -> Result<(TransactionStoreBox, TransactionStoreBox)> {
    let store =
        feeledger::infrastructure::rocksdb::RocksDbTransactionStore::open(path).into_diagnostic()?;
    Ok((Box::new(store.clone()), Box::new(store)))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent(_path: &Path) -> Result<(TransactionStoreBox, TransactionStoreBox)> {
    Err(miette::miette!(
        "persistent storage requires the storage-rocksdb feature"
    ))
}
