use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::amount::Amount;

/// One bookkeeping transaction. Its debit/credit lines are stored separately as
/// [`JournalEntryDetail`] rows keyed by the entry id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_of_created_invoice: Option<String>,
}

impl JournalEntry {
    pub fn new(id: impl Into<String>, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            id_of_created_invoice: None,
        }
    }

    pub fn creating_invoice(mut self, invoice_id: impl Into<String>) -> Self {
        self.id_of_created_invoice = Some(invoice_id.into());
        self
    }

    pub fn creates_invoice(&self, invoice_id: &str) -> bool {
        self.id_of_created_invoice.as_deref() == Some(invoice_id)
    }
}

/// A single debit or credit line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryDetail {
    /// Owning journal entry; assigned when the detail is persisted.
    #[serde(default)]
    pub journal_entry_id: String,
    /// Position within the owning entry; assigned when the detail is persisted.
    #[serde(default)]
    pub line: u32,
    pub account_id: String,
    pub amount: Amount,
    pub debit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

impl JournalEntryDetail {
    pub fn debit(account_id: impl Into<String>, amount: Amount) -> Self {
        Self::new(account_id, amount, true)
    }

    pub fn credit(account_id: impl Into<String>, amount: Amount) -> Self {
        Self::new(account_id, amount, false)
    }

    pub fn new(account_id: impl Into<String>, amount: Amount, debit: bool) -> Self {
        Self {
            journal_entry_id: String::new(),
            line: 0,
            account_id: account_id.into(),
            amount,
            debit,
            invoice_id: None,
            payment_id: None,
        }
    }

    pub fn for_invoice(mut self, invoice_id: impl Into<String>) -> Self {
        self.invoice_id = Some(invoice_id.into());
        self
    }

    pub fn with_payment_id(mut self, payment_id: impl Into<String>) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    /// Amount with debit positive and credit negative.
    pub fn signed_amount(&self) -> Amount {
        if self.debit {
            self.amount
        } else {
            -self.amount
        }
    }

    /// True when this line applies money to an invoice that `entry` did not create.
    pub fn is_payment_in(&self, entry: &JournalEntry) -> bool {
        match self.invoice_id.as_deref() {
            Some(invoice_id) => !entry.creates_invoice(invoice_id),
            None => false,
        }
    }

    /// Reduction of the invoice's outstanding amount this line represents.
    /// Credits reduce a receivable, debits reduce a payable.
    pub fn payment_amount(&self) -> Amount {
        -self.signed_amount()
    }
}

/// Journal entry together with its lines, as handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntryWithDetails {
    pub entry: JournalEntry,
    pub details: Vec<JournalEntryDetail>,
}

/// Debit and credit totals of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub debit: Amount,
    pub credit: Amount,
}

impl Totals {
    pub fn of(details: &[JournalEntryDetail]) -> Self {
        details.iter().fold(Totals::default(), |mut totals, detail| {
            if detail.debit {
                totals.debit += detail.amount;
            } else {
                totals.credit += detail.amount;
            }
            totals
        })
    }

    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }
}
