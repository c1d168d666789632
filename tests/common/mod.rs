#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use club_books::{
    core::services::LedgerService,
    domain::{
        Account, AccountType, Amount, Bookkeeping, Invoice, JournalEntry, JournalEntryDetail,
        Party,
    },
    storage::JsonStorage,
    Document,
};
use tempfile::TempDir;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn cents(value: i64) -> Amount {
    Amount::from_cents(value)
}

/// In-memory club with accounts 100, 101, 160, 190, 300, 400 and parties 1101..1103.
pub fn club() -> Document {
    let mut document = Document::new(Bookkeeping::new("Schaakclub De Pion", date(2011, 1, 1)));
    document
        .in_transaction(|tx| {
            for account in [
                Account::new("100", "Kas", AccountType::ASSET),
                Account::new("101", "Bank", AccountType::ASSET),
                Account::new("160", "Crediteuren", AccountType::CREDITOR),
                Account::new("190", "Debiteuren", AccountType::DEBTOR),
                Account::new("300", "Contributie", AccountType::REVENUE),
                Account::new("400", "Zaalhuur", AccountType::EXPENSE),
            ] {
                tx.accounts.create(account)?;
            }
            for party in [
                Party::new("1101", "Jan Janssen").with_tags(["senior"]),
                Party::new("1102", "Piet Pietersen").with_tags(["junior"]),
                Party::new("1103", "Klaas Klaassen").with_tags(["senior"]),
            ] {
                tx.parties.create(party)?;
            }
            Ok(())
        })
        .expect("seed club");
    document
}

/// Same club, saved to a JSON file inside a temporary directory.
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn file_backed_club() -> (TempDir, PathBuf, Document) {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("bookkeepings").join("club.json");
    let mut document = club();
    document
        .save_as(&path, Box::new(JsonStorage))
        .expect("save bookkeeping");
    (temp, path, document)
}

pub fn create_invoice(document: &mut Document, invoice_id: &str, party_id: &str, on: NaiveDate, amount: i64) {
    let entry_id = format!("j-{invoice_id}");
    document
        .in_transaction(|tx| {
            LedgerService::create_invoice_and_journal_entry(
                tx,
                Invoice::new(invoice_id, party_id, cents(amount), on),
                JournalEntry::new(entry_id, on, format!("Contributie {invoice_id}")),
                vec![
                    JournalEntryDetail::debit("190", cents(amount)).for_invoice(invoice_id),
                    JournalEntryDetail::credit("300", cents(amount)),
                ],
            )
        })
        .expect("create invoice");
}

pub fn pay_invoice(document: &mut Document, entry_id: &str, invoice_id: &str, on: NaiveDate, amount: i64) {
    document
        .in_transaction(|tx| {
            LedgerService::add_journal_entry(
                tx,
                JournalEntry::new(entry_id, on, format!("Betaling {invoice_id}")),
                vec![
                    JournalEntryDetail::debit("101", cents(amount)),
                    JournalEntryDetail::credit("190", cents(amount)).for_invoice(invoice_id),
                ],
                true,
            )
        })
        .expect("pay invoice");
}
