//! Creation, update and removal of journal entries and the invoices they create.

use tracing::info;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::document::{Tables, Transaction};
use crate::core::errors::{BookkeepingError, Result};
use crate::core::id_generator::IdFormat;
use crate::domain::{
    Invoice, JournalEntry, JournalEntryDetail, JournalEntryWithDetails, Payment, Totals,
};

/// Entry point for every journal mutation. All functions take the caller's
/// transaction so compound edits commit or roll back together.
pub struct LedgerService;

impl LedgerService {
    /// Checks that every line has a non-negative amount on a known account and
    /// that debits equal credits.
    pub fn validate_details(tables: &Tables, details: &[JournalEntryDetail]) -> Result<()> {
        for (index, detail) in details.iter().enumerate() {
            if detail.amount.is_negative() {
                return Err(BookkeepingError::NegativeAmount { line: index + 1 });
            }
            if !tables.accounts.exists(&detail.account_id) {
                return Err(BookkeepingError::AccountNotFound(detail.account_id.clone()));
            }
        }
        let totals = Totals::of(details);
        if !totals.is_balanced() {
            return Err(BookkeepingError::NotInBalance {
                debit: totals.debit,
                credit: totals.credit,
            });
        }
        Ok(())
    }

    /// Persists a balanced journal entry with its lines.
    ///
    /// With `update_invoice_linkage`, lines that pay an existing invoice must
    /// refer to a known invoice and receive a payment id when they have none.
    pub fn add_journal_entry(
        tx: &mut Transaction<'_>,
        entry: JournalEntry,
        details: Vec<JournalEntryDetail>,
        update_invoice_linkage: bool,
    ) -> Result<()> {
        Self::validate_details(tx, &details)?;
        if let Some(invoice_id) = entry.id_of_created_invoice.as_deref() {
            if !tx.invoices.exists(&invoice_id.to_string()) {
                return Err(BookkeepingError::InvoiceNotFound(invoice_id.to_string()));
            }
        }
        let details = if update_invoice_linkage {
            Self::link_payments(tx, &entry, details)?
        } else {
            details
        };
        Self::insert(tx, entry, details)
    }

    /// Replaces `old_entry_id` and its lines by `new_entry` and `new_details`.
    ///
    /// Refused while the old entry holds invoice payments without payment id.
    /// When the entry created an invoice, the new entry keeps creating that
    /// invoice; updating the invoice itself is a separate step (see
    /// [`LedgerService::update_invoice_and_journal_entry`]).
    pub fn update_journal_entry(
        tx: &mut Transaction<'_>,
        old_entry_id: &str,
        mut new_entry: JournalEntry,
        new_details: Vec<JournalEntryDetail>,
    ) -> Result<()> {
        let old_entry = Self::find_journal_entry(tx, old_entry_id)?.clone();
        if let Some(created) = old_entry.id_of_created_invoice.as_deref() {
            match new_entry.id_of_created_invoice.as_deref() {
                None => new_entry.id_of_created_invoice = Some(created.to_string()),
                Some(other) if other != created => {
                    return Err(BookkeepingError::Validation(format!(
                        "journal entry `{old_entry_id}` creates invoice `{created}` and cannot be moved to `{other}`"
                    )));
                }
                Some(_) => {}
            }
        }
        let unidentified_payment = tx
            .details_of(old_entry_id)
            .into_iter()
            .any(|detail| detail.is_payment_in(&old_entry) && detail.payment_id.is_none());
        if unidentified_payment {
            return Err(BookkeepingError::PaymentWithoutId(old_entry_id.to_string()));
        }
        Self::validate_details(tx, &new_details)?;
        if new_entry.id != old_entry.id && tx.journal_entries.exists(&new_entry.id) {
            return Err(BookkeepingError::DuplicateKey {
                table: "Journal entry",
                key: new_entry.id,
            });
        }
        if let Some(invoice_id) = new_entry.id_of_created_invoice.as_deref() {
            if !tx.invoices.exists(&invoice_id.to_string()) {
                return Err(BookkeepingError::InvoiceNotFound(invoice_id.to_string()));
            }
        }

        Self::delete_entry_rows(tx, old_entry_id)?;
        let new_details = Self::link_payments(tx, &new_entry, new_details)?;
        info!(old = %old_entry_id, new = %new_entry.id, "journal entry updated");
        Self::insert(tx, new_entry, new_details)
    }

    /// Deletes a journal entry and its lines.
    ///
    /// An entry that created an invoice takes the invoice with it, which is
    /// refused once payments for that invoice exist.
    pub fn remove_journal_entry(tx: &mut Transaction<'_>, entry_id: &str) -> Result<()> {
        let entry = Self::find_journal_entry(tx, entry_id)?.clone();
        if let Some(invoice_id) = entry.id_of_created_invoice.as_deref() {
            if Self::has_payments(tx, invoice_id) {
                return Err(BookkeepingError::InvoiceHasPayments {
                    journal_entry: entry.id.clone(),
                    invoice: invoice_id.to_string(),
                });
            }
            if tx.invoices.exists(&invoice_id.to_string()) {
                tx.invoices.delete(&invoice_id.to_string())?;
            }
        }
        Self::delete_entry_rows(tx, entry_id)?;
        info!(entry = %entry_id, "journal entry removed");
        Ok(())
    }

    /// Creates an invoice together with the journal entry that books it.
    pub fn create_invoice_and_journal_entry(
        tx: &mut Transaction<'_>,
        invoice: Invoice,
        entry: JournalEntry,
        details: Vec<JournalEntryDetail>,
    ) -> Result<()> {
        if !tx.parties.exists(&invoice.party_id) {
            return Err(BookkeepingError::PartyNotFound(invoice.party_id));
        }
        if let Some(created) = entry.id_of_created_invoice.as_deref() {
            if created != invoice.id {
                return Err(BookkeepingError::Validation(format!(
                    "journal entry `{}` creates invoice `{created}` instead of `{}`",
                    entry.id, invoice.id
                )));
            }
        }
        let invoice_id = invoice.id.clone();
        let entry = JournalEntry {
            id_of_created_invoice: Some(invoice_id.clone()),
            ..entry
        };
        tx.invoices.create(invoice)?;
        Self::add_journal_entry(tx, entry, details, true)?;
        info!(invoice = %invoice_id, "invoice created");
        Ok(())
    }

    /// Replaces the fields of an existing invoice.
    pub fn update_invoice(tx: &mut Transaction<'_>, invoice: Invoice) -> Result<()> {
        if !tx.invoices.exists(&invoice.id) {
            return Err(BookkeepingError::InvoiceNotFound(invoice.id));
        }
        if !tx.parties.exists(&invoice.party_id) {
            return Err(BookkeepingError::PartyNotFound(invoice.party_id));
        }
        tx.invoices.update(invoice)
    }

    /// Updates an invoice and the journal entry that created it in the caller's transaction.
    pub fn update_invoice_and_journal_entry(
        tx: &mut Transaction<'_>,
        invoice: Invoice,
        old_entry_id: &str,
        new_entry: JournalEntry,
        new_details: Vec<JournalEntryDetail>,
    ) -> Result<()> {
        let invoice_id = invoice.id.clone();
        Self::update_invoice(tx, invoice)?;
        let new_entry = JournalEntry {
            id_of_created_invoice: Some(invoice_id),
            ..new_entry
        };
        Self::update_journal_entry(tx, old_entry_id, new_entry, new_details)
    }

    pub fn find_journal_entry<'a>(tables: &'a Tables, id: &str) -> Result<&'a JournalEntry> {
        tables
            .journal_entries
            .find(&id.to_string())
            .ok_or_else(|| BookkeepingError::JournalEntryNotFound(id.to_string()))
    }

    /// Journal entries ordered by date, then id.
    pub fn journal_entries(tables: &Tables) -> Vec<&JournalEntry> {
        let mut entries: Vec<&JournalEntry> = tables.journal_entries.iter().collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    pub fn journal_entries_with_details(tables: &Tables) -> Vec<JournalEntryWithDetails> {
        Self::journal_entries(tables)
            .into_iter()
            .map(|entry| JournalEntryWithDetails {
                entry: entry.clone(),
                details: tables.details_of(&entry.id).into_iter().cloned().collect(),
            })
            .collect()
    }

    /// The journal entry whose lines created `invoice_id`.
    pub fn creating_journal_entry<'a>(
        tables: &'a Tables,
        invoice_id: &str,
    ) -> Option<&'a JournalEntry> {
        tables
            .journal_entries
            .iter()
            .find(|entry| entry.creates_invoice(invoice_id))
    }

    /// Payments for `invoice_id`, ordered by date.
    pub fn payments(tables: &Tables, invoice_id: &str) -> Vec<Payment> {
        let mut payments: Vec<Payment> = tables
            .journal_entry_details
            .iter()
            .filter(|detail| detail.invoice_id.as_deref() == Some(invoice_id))
            .filter_map(|detail| {
                let entry = tables.journal_entries.find(&detail.journal_entry_id)?;
                detail.is_payment_in(entry).then(|| Payment {
                    id: detail.payment_id.clone(),
                    invoice_id: invoice_id.to_string(),
                    journal_entry_id: entry.id.clone(),
                    date: entry.date,
                    amount: detail.payment_amount(),
                    description: entry.description.clone(),
                })
            })
            .collect();
        payments.sort_by(|a, b| a.date.cmp(&b.date));
        payments
    }

    pub fn has_payments(tables: &Tables, invoice_id: &str) -> bool {
        !Self::payments(tables, invoice_id).is_empty()
    }

    /// Next free journal entry id for the bookkeeping's id format.
    pub fn next_journal_entry_id(tables: &Tables, clock: &dyn Clock) -> Result<String> {
        let format = IdFormat::resolve(&tables.bookkeeping.journal_entry_id_format, clock.today())?;
        format.next_unused(tables.journal_entries.iter().map(|entry| entry.id.as_str()))
    }

    fn link_payments(
        tables: &Tables,
        entry: &JournalEntry,
        details: Vec<JournalEntryDetail>,
    ) -> Result<Vec<JournalEntryDetail>> {
        details
            .into_iter()
            .map(|mut detail| {
                if detail.is_payment_in(entry) {
                    let invoice_id = detail.invoice_id.clone().unwrap_or_default();
                    if !tables.invoices.exists(&invoice_id) {
                        return Err(BookkeepingError::InvoiceNotFound(invoice_id));
                    }
                    if detail.payment_id.is_none() {
                        detail.payment_id = Some(Uuid::new_v4().to_string());
                    }
                }
                Ok(detail)
            })
            .collect()
    }

    fn insert(
        tx: &mut Transaction<'_>,
        entry: JournalEntry,
        details: Vec<JournalEntryDetail>,
    ) -> Result<()> {
        let entry_id = entry.id.clone();
        tx.journal_entries.create(entry)?;
        for (line, mut detail) in details.into_iter().enumerate() {
            detail.journal_entry_id = entry_id.clone();
            detail.line = line as u32;
            tx.journal_entry_details.create(detail)?;
        }
        info!(entry = %entry_id, "journal entry added");
        Ok(())
    }

    fn delete_entry_rows(tx: &mut Transaction<'_>, entry_id: &str) -> Result<()> {
        tx.journal_entry_details
            .delete_where(|detail| detail.journal_entry_id == entry_id);
        tx.journal_entries.delete(&entry_id.to_string())?;
        Ok(())
    }
}
