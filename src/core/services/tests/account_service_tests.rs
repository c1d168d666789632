use super::{book_contribution, club};
use crate::core::errors::BookkeepingError;
use crate::core::services::AccountService;
use crate::domain::{Account, AccountType};

#[test]
fn accounts_are_listed_by_id() {
    let mut document = club();
    document
        .in_transaction(|tx| AccountService::add(tx, Account::new("050", "Inventaris", AccountType::ASSET)))
        .unwrap();

    let ids: Vec<&str> = AccountService::list(document.tables())
        .into_iter()
        .map(|account| account.id.as_str())
        .collect();
    assert_eq!(ids, vec!["050", "100", "101", "160", "190", "300", "400"]);
}

#[test]
fn account_without_name_is_rejected() {
    let mut document = club();
    let result = document.in_transaction(|tx| {
        AccountService::add(tx, Account::new("500", "  ", AccountType::EXPENSE))
    });
    assert!(matches!(result, Err(BookkeepingError::Validation(_))));
}

#[test]
fn duplicate_account_id_is_rejected() {
    let mut document = club();
    let result = document.in_transaction(|tx| {
        AccountService::add(tx, Account::new("100", "Tweede kas", AccountType::ASSET))
    });
    assert!(matches!(result, Err(BookkeepingError::DuplicateKey { .. })));
}

#[test]
fn used_account_cannot_be_removed() {
    let mut document = club();
    book_contribution(&mut document);

    assert!(AccountService::is_used(document.tables(), "190"));
    let result = document.in_transaction(|tx| AccountService::remove(tx, "190"));
    assert!(matches!(result, Err(BookkeepingError::AccountInUse(id)) if id == "190"));

    let removed = document
        .in_transaction(|tx| AccountService::remove(tx, "400"))
        .unwrap();
    assert_eq!(removed.name, "Zaalhuur");
    assert!(AccountService::find(document.tables(), "400").is_err());
}

#[test]
fn update_changes_name_and_type() {
    let mut document = club();
    document
        .in_transaction(|tx| {
            AccountService::update(tx, Account::new("160", "Te betalen", AccountType::LIABILITY))
        })
        .unwrap();

    let account = AccountService::find(document.tables(), "160").unwrap();
    assert_eq!(account.name, "Te betalen");
    assert_eq!(account.account_type, AccountType::LIABILITY);

    let missing = document.in_transaction(|tx| {
        AccountService::update(tx, Account::new("999", "Onbekend", AccountType::ASSET))
    });
    assert!(matches!(missing, Err(BookkeepingError::AccountNotFound(_))));
}
