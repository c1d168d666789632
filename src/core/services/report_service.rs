//! Point-in-time reports rebuilt from the full journal history.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::core::document::Tables;
use crate::domain::{
    report::{LedgerLine, Report},
    Amount, JournalEntry,
};

use super::{NoProgress, ProgressListener};

/// Builds [`Report`]s. Nothing is cached: every call replays the journal.
pub struct ReportService;

impl ReportService {
    pub fn build(tables: &Tables, end_date: NaiveDate) -> Report {
        Self::build_with_progress(tables, end_date, &mut NoProgress)
    }

    pub fn build_with_progress(
        tables: &Tables,
        end_date: NaiveDate,
        progress: &mut dyn ProgressListener,
    ) -> Report {
        progress.on_progress(0);
        let mut report = Report {
            end_date,
            accounts: tables.accounts.iter().cloned().collect(),
            ..Report::default()
        };
        for account in tables.accounts.iter() {
            report.balances.insert(account.id.clone(), Amount::ZERO);
            report.ledger_lines.insert(account.id.clone(), Vec::new());
        }

        let entries: Vec<&JournalEntry> = tables
            .journal_entries
            .iter()
            .filter(|entry| entry.date <= end_date)
            .collect();

        let mut paid: BTreeMap<String, Amount> = BTreeMap::new();
        for entry in &entries {
            for detail in tables.details_of(&entry.id) {
                *report
                    .balances
                    .entry(detail.account_id.clone())
                    .or_default() += detail.signed_amount();
                report
                    .ledger_lines
                    .entry(detail.account_id.clone())
                    .or_default()
                    .push(LedgerLine {
                        date: entry.date,
                        journal_entry_id: entry.id.clone(),
                        description: entry.description.clone(),
                        debit: detail.debit.then_some(detail.amount),
                        credit: (!detail.debit).then_some(detail.amount),
                        invoice_id: detail.invoice_id.clone(),
                    });
                if detail.is_payment_in(entry) {
                    if let Some(invoice_id) = detail.invoice_id.as_ref() {
                        *paid.entry(invoice_id.clone()).or_default() += detail.payment_amount();
                    }
                }
            }
        }
        for lines in report.ledger_lines.values_mut() {
            lines.sort_by_key(|line| line.date);
        }

        for invoice in tables
            .invoices
            .iter()
            .filter(|invoice| invoice.issue_date <= end_date)
        {
            let remaining = invoice.amount_to_be_paid
                - paid.get(&invoice.id).copied().unwrap_or_default();
            if remaining.is_zero() {
                continue;
            }
            report
                .remaining_amounts
                .insert(invoice.id.clone(), remaining);
            report
                .invoice_parties
                .insert(invoice.id.clone(), invoice.party_id.clone());
            if remaining.is_positive() {
                *report.debtors.entry(invoice.party_id.clone()).or_default() += remaining;
            } else {
                *report.creditors.entry(invoice.party_id.clone()).or_default() -= remaining;
            }
        }

        debug!(
            %end_date,
            entries = entries.len(),
            open_invoices = report.remaining_amounts.len(),
            "report built"
        );
        progress.on_progress(100);
        report
    }
}
