//! Bulk invoice generation from templates and invoice overviews.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::clock::Clock;
use crate::core::document::{Document, Tables, Transaction};
use crate::core::errors::{BookkeepingError, PartyFailure, Result};
use crate::core::formula::AmountFormula;
use crate::core::id_generator::IdFormat;
use crate::domain::{
    Amount, Invoice, InvoiceOverview, JournalEntry, JournalEntryDetail, Party,
};

use super::{LedgerService, ProgressListener};

const ID_KEYWORD: &str = "{id}";
const NAME_KEYWORD: &str = "{name}";

/// Template for invoicing many parties at once.
///
/// `id_pattern` and `description` may contain `{id}` and `{name}`, replaced by
/// the party's id and name. An empty `id_pattern` uses the bookkeeping's
/// invoice id format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTemplate {
    pub id_pattern: String,
    pub issue_date: NaiveDate,
    pub description: String,
    pub lines: Vec<InvoiceTemplateLine>,
}

/// One line of an [`InvoiceTemplate`].
///
/// Exactly one line per template carries `amount_to_be_paid`; it is booked on
/// the debtor or creditor account and its amount becomes the invoice total.
/// Every other line is booked on its own `account_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTemplateLine {
    pub description: String,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub debit: bool,
    #[serde(default)]
    pub amount_to_be_paid: bool,
}

impl InvoiceTemplateLine {
    pub fn amount_to_be_paid(formula: impl Into<String>, debit: bool) -> Self {
        Self {
            description: String::new(),
            formula: formula.into(),
            account_id: None,
            debit,
            amount_to_be_paid: true,
        }
    }

    pub fn booked_on(
        description: impl Into<String>,
        formula: impl Into<String>,
        account_id: impl Into<String>,
        debit: bool,
    ) -> Self {
        Self {
            description: description.into(),
            formula: formula.into(),
            account_id: Some(account_id.into()),
            debit,
            amount_to_be_paid: false,
        }
    }
}

struct ParsedLine<'t> {
    line: &'t InvoiceTemplateLine,
    formula: AmountFormula,
}

/// Creates invoices for parties; holds the collaborators it needs.
pub struct InvoiceService {
    clock: Box<dyn Clock>,
    decimal_separator: char,
}

impl InvoiceService {
    pub fn new(clock: Box<dyn Clock>, decimal_separator: char) -> Self {
        Self {
            clock,
            decimal_separator,
        }
    }

    /// Creates one invoice plus creating journal entry per party.
    ///
    /// Template errors abort before anything is created. Afterwards each
    /// party is its own transaction: parties that succeed stay committed even
    /// when others fail, and failures are reported together as
    /// [`BookkeepingError::IncompleteBatch`]. Returns the created invoice ids.
    pub fn create_invoice_and_journal_entry_for_parties(
        &self,
        document: &mut Document,
        debtor_or_creditor_account: &str,
        template: &InvoiceTemplate,
        parties: &[Party],
        progress: &mut dyn ProgressListener,
    ) -> Result<Vec<String>> {
        progress.on_progress(0);
        let lines = self.parse_template(document.tables(), debtor_or_creditor_account, template)?;

        let mut created = Vec::new();
        let mut failures = Vec::new();
        for party in parties {
            let outcome = document.in_transaction(|tx| {
                self.create_for_party(tx, debtor_or_creditor_account, template, &lines, party)
            });
            match outcome {
                Ok(invoice_id) => created.push(invoice_id),
                Err(error) => {
                    warn!(party = %party.id, %error, "invoice creation failed");
                    failures.push(PartyFailure {
                        party_id: party.id.clone(),
                        error,
                    });
                }
            }
        }
        progress.on_progress(100);
        info!(created = created.len(), failed = failures.len(), "invoice batch finished");

        if failures.is_empty() {
            Ok(created)
        } else {
            Err(BookkeepingError::IncompleteBatch { created, failures })
        }
    }

    fn parse_template<'t>(
        &self,
        tables: &Tables,
        debtor_or_creditor_account: &str,
        template: &'t InvoiceTemplate,
    ) -> Result<Vec<ParsedLine<'t>>> {
        if !tables.accounts.exists(&debtor_or_creditor_account.to_string()) {
            return Err(BookkeepingError::AccountNotFound(
                debtor_or_creditor_account.to_string(),
            ));
        }
        let totals = template
            .lines
            .iter()
            .filter(|line| line.amount_to_be_paid)
            .count();
        if totals != 1 {
            return Err(BookkeepingError::Validation(format!(
                "exactly one line must hold the amount to be paid, found {totals}"
            )));
        }
        template
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if !line.amount_to_be_paid && line.account_id.is_none() {
                    return Err(BookkeepingError::Validation(format!(
                        "line {} has no account",
                        index + 1
                    )));
                }
                let formula = AmountFormula::parse(&line.formula, self.decimal_separator)?;
                Ok(ParsedLine { line, formula })
            })
            .collect()
    }

    fn create_for_party(
        &self,
        tx: &mut Transaction<'_>,
        debtor_or_creditor_account: &str,
        template: &InvoiceTemplate,
        lines: &[ParsedLine<'_>],
        party: &Party,
    ) -> Result<String> {
        let invoice_id = self.invoice_id_for(tx, template, party)?;
        let description = substitute(&template.description, party);

        let mut invoice = Invoice::new(
            invoice_id.clone(),
            party.id.clone(),
            Amount::ZERO,
            template.issue_date,
        )
        .with_line(description.clone(), None);
        let mut details = Vec::new();
        let mut total = None;

        for parsed in lines {
            let Some(amount) = parsed.formula.evaluate(&party.tags) else {
                continue;
            };
            let line = parsed.line;
            if line.amount_to_be_paid {
                details.push(
                    JournalEntryDetail::new(debtor_or_creditor_account, amount, line.debit)
                        .for_invoice(invoice_id.clone()),
                );
                total = Some(if line.debit { amount } else { -amount });
            } else {
                let account_id = line.account_id.clone().unwrap_or_default();
                details.push(JournalEntryDetail::new(account_id, amount, line.debit));
                invoice = invoice.with_line(substitute(&line.description, party), Some(amount));
            }
        }

        invoice.amount_to_be_paid = total.ok_or_else(|| {
            BookkeepingError::Validation(format!(
                "amount to be paid does not apply to party `{}`",
                party.id
            ))
        })?;
        let entry_id = LedgerService::next_journal_entry_id(tx, self.clock.as_ref())?;
        let entry = JournalEntry::new(entry_id, template.issue_date, description)
            .creating_invoice(invoice_id.clone());
        LedgerService::create_invoice_and_journal_entry(tx, invoice, entry, details)?;
        Ok(invoice_id)
    }

    /// Id from the template's keywords; on collision (or without a pattern)
    /// the next id of the bookkeeping's invoice id format.
    fn invoice_id_for(
        &self,
        tables: &Tables,
        template: &InvoiceTemplate,
        party: &Party,
    ) -> Result<String> {
        if !template.id_pattern.trim().is_empty() {
            let candidate = substitute(&template.id_pattern, party);
            if !tables.invoices.exists(&candidate) {
                return Ok(candidate);
            }
        }
        let format = IdFormat::resolve(&tables.bookkeeping.invoice_id_format, self.clock.today())?;
        format.next_unused(tables.invoices.iter().map(|invoice| invoice.id.as_str()))
    }

    /// Invoices issued on or before `date` with their payments up to that date.
    pub fn overviews(tables: &Tables, date: NaiveDate, include_closed: bool) -> Vec<InvoiceOverview> {
        tables
            .invoices
            .iter()
            .filter(|invoice| invoice.issue_date <= date)
            .map(|invoice| {
                let payments: Vec<_> = LedgerService::payments(tables, &invoice.id)
                    .into_iter()
                    .filter(|payment| payment.date <= date)
                    .collect();
                let party_name = tables
                    .parties
                    .find(&invoice.party_id)
                    .map(|party| party.name.clone())
                    .unwrap_or_default();
                InvoiceOverview {
                    invoice: invoice.clone(),
                    party_name,
                    amount_paid: payments.iter().map(|payment| payment.amount).sum(),
                    payments,
                }
            })
            .filter(|overview| include_closed || !overview.is_closed())
            .collect()
    }
}

fn substitute(pattern: &str, party: &Party) -> String {
    pattern
        .replace(ID_KEYWORD, &party.id)
        .replace(NAME_KEYWORD, &party.name)
}
