use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::{account::Account, amount::Amount};

/// One journal entry line as it appears in an account's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerLine {
    pub date: NaiveDate,
    pub journal_entry_id: String,
    pub description: String,
    pub debit: Option<Amount>,
    pub credit: Option<Amount>,
    pub invoice_id: Option<String>,
}

/// Account balances, ledgers and open invoice positions as of `end_date`.
///
/// Balances in `balances` count debits positive and credits negative; use
/// [`Report::normal_balance`] for the sign that follows the account type.
/// Creditor balances are stored as positive amounts owed to the party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub end_date: NaiveDate,
    pub accounts: Vec<Account>,
    pub balances: BTreeMap<String, Amount>,
    pub ledger_lines: BTreeMap<String, Vec<LedgerLine>>,
    pub remaining_amounts: BTreeMap<String, Amount>,
    pub invoice_parties: BTreeMap<String, String>,
    pub debtors: BTreeMap<String, Amount>,
    pub creditors: BTreeMap<String, Amount>,
}

impl Report {
    pub fn account_balance(&self, account_id: &str) -> Amount {
        self.balances.get(account_id).copied().unwrap_or_default()
    }

    /// Balance that is positive on the account's normal side.
    pub fn normal_balance(&self, account: &Account) -> Amount {
        let balance = self.account_balance(&account.id);
        if account.is_debit_normal() {
            balance
        } else {
            -balance
        }
    }

    pub fn ledger_lines_for(&self, account_id: &str) -> &[LedgerLine] {
        self.ledger_lines
            .get(account_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Outstanding amount of an invoice; zero for paid or unknown invoices.
    pub fn remaining_amount(&self, invoice_id: &str) -> Amount {
        self.remaining_amounts
            .get(invoice_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn open_invoices(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.remaining_amounts
            .iter()
            .map(|(id, amount)| (id.as_str(), *amount))
    }

    pub fn open_invoices_of_party<'a>(&'a self, party_id: &'a str) -> Vec<&'a str> {
        self.invoice_parties
            .iter()
            .filter(|(_, owner)| owner.as_str() == party_id)
            .map(|(invoice_id, _)| invoice_id.as_str())
            .collect()
    }

    pub fn balance_for_debtor(&self, party_id: &str) -> Amount {
        self.debtors.get(party_id).copied().unwrap_or_default()
    }

    pub fn balance_for_creditor(&self, party_id: &str) -> Amount {
        self.creditors.get(party_id).copied().unwrap_or_default()
    }

    /// Debtors ordered by party id.
    pub fn debtors(&self) -> Vec<(&str, Amount)> {
        self.debtors
            .iter()
            .map(|(id, amount)| (id.as_str(), *amount))
            .collect()
    }

    /// Creditors ordered by party id.
    pub fn creditors(&self) -> Vec<(&str, Amount)> {
        self.creditors
            .iter()
            .map(|(id, amount)| (id.as_str(), *amount))
            .collect()
    }

    pub fn total_debtors(&self) -> Amount {
        self.debtors.values().sum()
    }

    pub fn total_creditors(&self) -> Amount {
        self.creditors.values().sum()
    }

    /// Balance-sheet accounts on the debit side.
    pub fn assets(&self) -> Vec<&Account> {
        self.accounts_where(|account| {
            account.account_type.is_balance_sheet_account() && account.is_debit_normal()
        })
    }

    /// Balance-sheet accounts on the credit side, equity included.
    pub fn liabilities(&self) -> Vec<&Account> {
        self.accounts_where(|account| {
            account.account_type.is_balance_sheet_account() && !account.is_debit_normal()
        })
    }

    pub fn expenses(&self) -> Vec<&Account> {
        self.accounts_where(|account| {
            !account.account_type.is_balance_sheet_account() && account.is_debit_normal()
        })
    }

    pub fn revenues(&self) -> Vec<&Account> {
        self.accounts_where(|account| {
            !account.account_type.is_balance_sheet_account() && !account.is_debit_normal()
        })
    }

    pub fn total_assets(&self) -> Amount {
        self.assets().into_iter().map(|a| self.normal_balance(a)).sum()
    }

    pub fn total_liabilities(&self) -> Amount {
        self.liabilities().into_iter().map(|a| self.normal_balance(a)).sum()
    }

    /// Revenues minus expenses; positive is a profit.
    pub fn result_of_operations(&self) -> Amount {
        let revenues: Amount = self.revenues().into_iter().map(|a| self.normal_balance(a)).sum();
        let expenses: Amount = self.expenses().into_iter().map(|a| self.normal_balance(a)).sum();
        revenues - expenses
    }

    fn accounts_where<F>(&self, filter: F) -> Vec<&Account>
    where
        F: Fn(&Account) -> bool,
    {
        self.accounts.iter().filter(|account| filter(account)).collect()
    }
}
