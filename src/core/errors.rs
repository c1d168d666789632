use std::result::Result as StdResult;

use thiserror::Error;

use crate::core::formula::FormulaError;
use crate::domain::Amount;

/// Unified error type for the domain, service and storage layers.
#[derive(Error, Debug)]
pub enum BookkeepingError {
    #[error("entries are not in balance (debit {debit}, credit {credit})")]
    NotInBalance { debit: Amount, credit: Amount },
    #[error("amount of line {line} must not be negative")]
    NegativeAmount { line: usize },
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Party not found: {0}")]
    PartyNotFound(String),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),
    #[error("Journal entry not found: {0}")]
    JournalEntryNotFound(String),
    #[error("{table} `{key}` already exists")]
    DuplicateKey { table: &'static str, key: String },
    #[error("{table} `{key}` does not exist")]
    MissingKey { table: &'static str, key: String },
    #[error("Account `{0}` is used by journal entries and cannot be deleted")]
    AccountInUse(String),
    #[error("Party `{0}` has invoices and cannot be deleted")]
    PartyInUse(String),
    #[error("Journal entry `{journal_entry}` created invoice `{invoice}` which already has payments")]
    InvoiceHasPayments {
        journal_entry: String,
        invoice: String,
    },
    #[error("Journal entry `{0}` contains an invoice payment without payment id")]
    PaymentWithoutId(String),
    #[error("Malformed stored id `{id}`: {reason}")]
    MalformedId { id: String, reason: String },
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("Invoices could not be created for parties: {}", join_parties(.failures))]
    IncompleteBatch {
        created: Vec<String>,
        failures: Vec<PartyFailure>,
    },
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reason creation failed for one party in a batch.
#[derive(Debug)]
pub struct PartyFailure {
    pub party_id: String,
    pub error: BookkeepingError,
}

impl BookkeepingError {
    /// Party ids named by an aggregate batch error; empty for other variants.
    pub fn failed_parties(&self) -> Vec<&str> {
        match self {
            BookkeepingError::IncompleteBatch { failures, .. } => {
                failures.iter().map(|f| f.party_id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn join_parties(failures: &[PartyFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.party_id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = StdResult<T, BookkeepingError>;

impl From<std::io::Error> for BookkeepingError {
    fn from(err: std::io::Error) -> Self {
        BookkeepingError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BookkeepingError {
    fn from(err: serde_json::Error) -> Self {
        BookkeepingError::Storage(err.to_string())
    }
}
