use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of account classifications used in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Asset,
    Debtor,
    Liability,
    Creditor,
    Equity,
    Expense,
    Revenue,
}

/// Account classification carrying its two fixed facets.
///
/// Values only come from the associated constants, so the facets always agree
/// with the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AccountKind", into = "AccountKind")]
pub struct AccountType {
    kind: AccountKind,
    debit_normal: bool,
    balance_sheet: bool,
}

impl AccountType {
    pub const ASSET: AccountType = AccountType::new(AccountKind::Asset, true, true);
    pub const DEBTOR: AccountType = AccountType::new(AccountKind::Debtor, true, true);
    pub const LIABILITY: AccountType = AccountType::new(AccountKind::Liability, false, true);
    pub const CREDITOR: AccountType = AccountType::new(AccountKind::Creditor, false, true);
    pub const EQUITY: AccountType = AccountType::new(AccountKind::Equity, false, true);
    pub const EXPENSE: AccountType = AccountType::new(AccountKind::Expense, true, false);
    pub const REVENUE: AccountType = AccountType::new(AccountKind::Revenue, false, false);

    pub const ALL: [AccountType; 7] = [
        Self::ASSET,
        Self::DEBTOR,
        Self::LIABILITY,
        Self::CREDITOR,
        Self::EQUITY,
        Self::EXPENSE,
        Self::REVENUE,
    ];

    const fn new(kind: AccountKind, debit_normal: bool, balance_sheet: bool) -> Self {
        Self {
            kind,
            debit_normal,
            balance_sheet,
        }
    }

    pub const fn of(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Asset => Self::ASSET,
            AccountKind::Debtor => Self::DEBTOR,
            AccountKind::Liability => Self::LIABILITY,
            AccountKind::Creditor => Self::CREDITOR,
            AccountKind::Equity => Self::EQUITY,
            AccountKind::Expense => Self::EXPENSE,
            AccountKind::Revenue => Self::REVENUE,
        }
    }

    pub const fn kind(self) -> AccountKind {
        self.kind
    }

    /// True when the balance increases on debit.
    pub const fn is_debit_normal(self) -> bool {
        self.debit_normal
    }

    /// True for balance-sheet accounts, false for profit-and-loss accounts.
    pub const fn is_balance_sheet_account(self) -> bool {
        self.balance_sheet
    }
}

impl From<AccountKind> for AccountType {
    fn from(kind: AccountKind) -> Self {
        AccountType::of(kind)
    }
}

impl From<AccountType> for AccountKind {
    fn from(value: AccountType) -> Self {
        value.kind
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Asset => "asset",
            AccountKind::Debtor => "debtor",
            AccountKind::Liability => "liability",
            AccountKind::Creditor => "creditor",
            AccountKind::Equity => "equity",
            AccountKind::Expense => "expense",
            AccountKind::Revenue => "revenue",
        };
        f.write_str(label)
    }
}

/// Chart-of-accounts entry. The id is unique within one bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_type,
        }
    }

    pub fn is_debit_normal(&self) -> bool {
        self.account_type.is_debit_normal()
    }
}
