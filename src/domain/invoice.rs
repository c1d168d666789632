use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::amount::Amount;

/// Claim for payment issued to (or received from) a party.
///
/// `amount_to_be_paid` is positive when the party owes money and negative when
/// the organization owes the party. The outstanding amount is never stored; it
/// is derived from payment lines in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub party_id: String,
    pub amount_to_be_paid: Amount,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub line_amounts: Vec<Option<Amount>>,
}

impl Invoice {
    pub fn new(
        id: impl Into<String>,
        party_id: impl Into<String>,
        amount_to_be_paid: Amount,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            party_id: party_id.into(),
            amount_to_be_paid,
            issue_date,
            descriptions: Vec::new(),
            line_amounts: Vec::new(),
        }
    }

    pub fn with_line(mut self, description: impl Into<String>, amount: Option<Amount>) -> Self {
        self.descriptions.push(description.into());
        self.line_amounts.push(amount);
        self
    }

    /// Description and amount pairs in order.
    pub fn lines(&self) -> impl Iterator<Item = (&str, Option<Amount>)> + '_ {
        self.descriptions
            .iter()
            .map(String::as_str)
            .zip(self.line_amounts.iter().copied().chain(std::iter::repeat(None)))
    }
}

/// A journal entry line that reduces an invoice's outstanding amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: Option<String>,
    pub invoice_id: String,
    pub journal_entry_id: String,
    pub date: NaiveDate,
    pub amount: Amount,
    pub description: String,
}

/// Invoice state as of a given date, for overviews and reminders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceOverview {
    pub invoice: Invoice,
    pub party_name: String,
    pub amount_paid: Amount,
    pub payments: Vec<Payment>,
}

impl InvoiceOverview {
    pub fn remaining(&self) -> Amount {
        self.invoice.amount_to_be_paid - self.amount_paid
    }

    pub fn is_closed(&self) -> bool {
        self.remaining().is_zero()
    }
}
