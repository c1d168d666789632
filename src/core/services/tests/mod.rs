mod account_service_tests;
mod invoice_service_tests;

use chrono::NaiveDate;

use crate::core::document::Document;
use crate::core::services::LedgerService;
use crate::domain::{
    Account, AccountType, Amount, Bookkeeping, Invoice, JournalEntry, JournalEntryDetail, Party,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(super) fn cents(value: i64) -> Amount {
    Amount::from_cents(value)
}

/// Small club with a chart of accounts and three members.
pub(super) fn club() -> Document {
    let mut document = Document::new(Bookkeeping::new("Schaakclub", date(2011, 1, 1)));
    document
        .in_transaction(|tx| {
            for account in [
                Account::new("100", "Kas", AccountType::ASSET),
                Account::new("101", "Bank", AccountType::ASSET),
                Account::new("190", "Debiteuren", AccountType::DEBTOR),
                Account::new("160", "Crediteuren", AccountType::CREDITOR),
                Account::new("300", "Contributie", AccountType::REVENUE),
                Account::new("400", "Zaalhuur", AccountType::EXPENSE),
            ] {
                tx.accounts.create(account)?;
            }
            for party in [
                Party::new("1101", "Jan Janssen").with_tags(["senior"]),
                Party::new("1102", "Piet Pietersen").with_tags(["junior"]),
                Party::new("1103", "Klaas Klaassen").with_tags(["senior", "bestuur"]),
            ] {
                tx.parties.create(party)?;
            }
            Ok(())
        })
        .unwrap();
    document
}

/// Books invoice `inv1` of 20,00 for party 1101 on 2011-03-05 as entry `j1`.
pub(super) fn book_contribution(document: &mut Document) {
    document
        .in_transaction(|tx| {
            LedgerService::create_invoice_and_journal_entry(
                tx,
                Invoice::new("inv1", "1101", cents(2000), date(2011, 3, 5)),
                JournalEntry::new("j1", date(2011, 3, 5), "Contributie 2011"),
                vec![
                    JournalEntryDetail::debit("190", cents(2000)).for_invoice("inv1"),
                    JournalEntryDetail::credit("300", cents(2000)),
                ],
            )
        })
        .unwrap();
}

/// Lines of a payment received on the bank account for `invoice_id`.
pub(super) fn payment_lines(invoice_id: &str, amount: i64) -> Vec<JournalEntryDetail> {
    vec![
        JournalEntryDetail::debit("101", cents(amount)),
        JournalEntryDetail::credit("190", cents(amount)).for_invoice(invoice_id),
    ]
}

pub(super) fn book_payment(document: &mut Document, entry_id: &str, on: NaiveDate, amount: i64) {
    document
        .in_transaction(|tx| {
            LedgerService::add_journal_entry(
                tx,
                JournalEntry::new(entry_id, on, "Betaling contributie"),
                payment_lines("inv1", amount),
                true,
            )
        })
        .unwrap();
}
