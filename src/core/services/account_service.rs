use tracing::info;

use crate::core::document::{Tables, Transaction};
use crate::core::errors::{BookkeepingError, Result};
use crate::domain::Account;

/// Validated CRUD helpers for the chart of accounts.
pub struct AccountService;

impl AccountService {
    pub fn add(tx: &mut Transaction<'_>, account: Account) -> Result<()> {
        Self::validate(&account)?;
        let id = account.id.clone();
        tx.accounts.create(account)?;
        info!(account = %id, "account added");
        Ok(())
    }

    pub fn update(tx: &mut Transaction<'_>, account: Account) -> Result<()> {
        Self::validate(&account)?;
        if !tx.accounts.exists(&account.id) {
            return Err(BookkeepingError::AccountNotFound(account.id));
        }
        tx.accounts.update(account)
    }

    /// Deletes an account that no journal entry line refers to.
    pub fn remove(tx: &mut Transaction<'_>, id: &str) -> Result<Account> {
        if !tx.accounts.exists(&id.to_string()) {
            return Err(BookkeepingError::AccountNotFound(id.to_string()));
        }
        if Self::is_used(tx, id) {
            return Err(BookkeepingError::AccountInUse(id.to_string()));
        }
        let removed = tx.accounts.delete(&id.to_string())?;
        info!(account = %id, "account removed");
        Ok(removed)
    }

    pub fn is_used(tables: &Tables, id: &str) -> bool {
        tables
            .journal_entry_details
            .iter()
            .any(|detail| detail.account_id == id)
    }

    pub fn find<'a>(tables: &'a Tables, id: &str) -> Result<&'a Account> {
        tables
            .accounts
            .find(&id.to_string())
            .ok_or_else(|| BookkeepingError::AccountNotFound(id.to_string()))
    }

    /// All accounts ordered by id.
    pub fn list(tables: &Tables) -> Vec<&Account> {
        tables.accounts.iter().collect()
    }

    fn validate(account: &Account) -> Result<()> {
        if account.id.trim().is_empty() {
            return Err(BookkeepingError::Validation("account id is required".into()));
        }
        if account.name.trim().is_empty() {
            return Err(BookkeepingError::Validation(format!(
                "account `{}` needs a name",
                account.id
            )));
        }
        Ok(())
    }
}
