use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INVOICE_ID_FORMAT: &str = "yyyynnnn";
pub const DEFAULT_JOURNAL_ENTRY_ID_FORMAT: &str = "yyyymmnnnn";

/// Settings of one bookkeeping (one organization, one currency).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookkeeping {
    pub organization_name: String,
    #[serde(default)]
    pub description: String,
    pub start_of_period: NaiveDate,
    pub currency: String,
    #[serde(default = "default_invoice_id_format")]
    pub invoice_id_format: String,
    #[serde(default = "default_journal_entry_id_format")]
    pub journal_entry_id_format: String,
}

impl Bookkeeping {
    pub fn new(organization_name: impl Into<String>, start_of_period: NaiveDate) -> Self {
        Self {
            organization_name: organization_name.into(),
            description: String::new(),
            start_of_period,
            currency: "EUR".into(),
            invoice_id_format: default_invoice_id_format(),
            journal_entry_id_format: default_journal_entry_id_format(),
        }
    }
}

impl Default for Bookkeeping {
    fn default() -> Self {
        Self::new("", NaiveDate::default())
    }
}

fn default_invoice_id_format() -> String {
    DEFAULT_INVOICE_ID_FORMAT.into()
}

fn default_journal_entry_id_format() -> String {
    DEFAULT_JOURNAL_ENTRY_ID_FORMAT.into()
}
