use super::{book_contribution, book_payment, club, cents, date};
use crate::core::clock::FixedClock;
use crate::core::document::Document;
use crate::core::errors::BookkeepingError;
use crate::core::services::{
    InvoiceService, InvoiceTemplate, InvoiceTemplateLine, LedgerService, NoProgress,
};
use crate::domain::{Party, Totals};

fn service() -> InvoiceService {
    InvoiceService::new(Box::new(FixedClock(date(2024, 2, 1))), '.')
}

fn template(id_pattern: &str, formula: &str) -> InvoiceTemplate {
    InvoiceTemplate {
        id_pattern: id_pattern.into(),
        issue_date: date(2011, 3, 5),
        description: "Contributie 2011 {name}".into(),
        lines: vec![
            InvoiceTemplateLine::amount_to_be_paid(formula, true),
            InvoiceTemplateLine::booked_on("Contributie", formula, "300", false),
        ],
    }
}

fn members(document: &Document) -> Vec<Party> {
    document.tables().parties.iter().cloned().collect()
}

#[test]
fn creates_one_invoice_and_entry_per_party() {
    let mut document = club();
    let parties = members(&document);
    let mut seen = Vec::new();
    let mut record = |percentage: u8| seen.push(percentage);

    let created = service()
        .create_invoice_and_journal_entry_for_parties(
            &mut document,
            "190",
            &template("C-{id}", "if (junior) 10 else 20"),
            &parties,
            &mut record,
        )
        .unwrap();

    assert_eq!(created, vec!["C-1101", "C-1102", "C-1103"]);
    assert_eq!(seen, vec![0, 100]);
    assert_eq!(document.revision(), 4);

    let tables = document.tables();
    let junior = tables.invoices.find(&"C-1102".to_string()).unwrap();
    assert_eq!(junior.amount_to_be_paid, cents(1000));
    assert_eq!(junior.descriptions[0], "Contributie 2011 Piet Pietersen");
    assert_eq!(junior.line_amounts, vec![None, Some(cents(1000))]);
    assert_eq!(
        tables.invoices.find(&"C-1101".to_string()).unwrap().amount_to_be_paid,
        cents(2000)
    );

    let entry = LedgerService::creating_journal_entry(tables, "C-1101").unwrap();
    assert_eq!(entry.id, "2024020001");
    assert_eq!(entry.date, date(2011, 3, 5));
    let details: Vec<_> = tables.details_of(&entry.id).into_iter().cloned().collect();
    assert!(Totals::of(&details).is_balanced());
    assert_eq!(details[0].account_id, "190");
    assert_eq!(details[0].invoice_id.as_deref(), Some("C-1101"));
    assert_eq!(
        LedgerService::creating_journal_entry(tables, "C-1103").map(|entry| entry.id.as_str()),
        Some("2024020003")
    );
}

#[test]
fn colliding_id_falls_back_to_invoice_format() {
    let mut document = club();
    let party = vec![document.tables().parties.find(&"1101".to_string()).unwrap().clone()];
    let template = template("C-{id}", "20");

    for _ in 0..2 {
        service()
            .create_invoice_and_journal_entry_for_parties(
                &mut document,
                "190",
                &template,
                &party,
                &mut NoProgress,
            )
            .unwrap();
    }

    let ids: Vec<&str> = document
        .tables()
        .invoices
        .iter()
        .map(|invoice| invoice.id.as_str())
        .collect();
    assert_eq!(ids, vec!["20240001", "C-1101"]);
}

#[test]
fn template_errors_abort_before_any_invoice_is_created() {
    let mut document = club();
    let parties = members(&document);

    let mut two_totals = template("", "20");
    two_totals
        .lines
        .push(InvoiceTemplateLine::amount_to_be_paid("5", true));
    let result = service().create_invoice_and_journal_entry_for_parties(
        &mut document,
        "190",
        &two_totals,
        &parties,
        &mut NoProgress,
    );
    assert!(matches!(result, Err(BookkeepingError::Validation(_))));

    let result = service().create_invoice_and_journal_entry_for_parties(
        &mut document,
        "190",
        &template("", "if (junior 10"),
        &parties,
        &mut NoProgress,
    );
    assert!(matches!(result, Err(BookkeepingError::Formula(_))));

    let result = service().create_invoice_and_journal_entry_for_parties(
        &mut document,
        "199",
        &template("", "20"),
        &parties,
        &mut NoProgress,
    );
    assert!(matches!(result, Err(BookkeepingError::AccountNotFound(id)) if id == "199"));

    assert!(document.tables().invoices.is_empty());
    assert_eq!(document.revision(), 1);
}

#[test]
fn parties_without_applicable_amount_are_reported() {
    let mut document = club();
    let parties = members(&document);

    let err = service()
        .create_invoice_and_journal_entry_for_parties(
            &mut document,
            "190",
            &template("C-{id}", "if (junior) 10"),
            &parties,
            &mut NoProgress,
        )
        .unwrap_err();

    assert_eq!(err.failed_parties(), vec!["1101", "1103"]);
    match err {
        BookkeepingError::IncompleteBatch { created, .. } => assert_eq!(created, vec!["C-1102"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(document.tables().invoices.len(), 1);
    assert_eq!(document.tables().journal_entries.len(), 1);
}

#[test]
fn overviews_follow_payments_up_to_the_date() {
    let mut document = club();
    book_contribution(&mut document);
    book_payment(&mut document, "j2", date(2011, 5, 10), 1000);

    let early = InvoiceService::overviews(document.tables(), date(2011, 4, 1), false);
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].party_name, "Jan Janssen");
    assert_eq!(early[0].amount_paid, cents(0));
    assert_eq!(early[0].remaining(), cents(2000));

    let later = InvoiceService::overviews(document.tables(), date(2011, 12, 31), false);
    assert_eq!(later[0].remaining(), cents(1000));
    assert_eq!(later[0].payments.len(), 1);

    book_payment(&mut document, "j3", date(2011, 6, 1), 1000);
    assert!(InvoiceService::overviews(document.tables(), date(2011, 12, 31), false).is_empty());
    let all = InvoiceService::overviews(document.tables(), date(2011, 12, 31), true);
    assert!(all[0].is_closed());

    assert!(InvoiceService::overviews(document.tables(), date(2011, 1, 1), true).is_empty());
}
