use std::collections::BTreeSet;

use crate::core::document::{Tables, Transaction};
use crate::core::errors::{BookkeepingError, Result};
use crate::core::formula::Criterion;
use crate::domain::Party;

/// Helpers for the parties invoices are issued to.
pub struct PartyService;

impl PartyService {
    pub fn add(tx: &mut Transaction<'_>, party: Party) -> Result<()> {
        if party.id.trim().is_empty() {
            return Err(BookkeepingError::Validation("party id is required".into()));
        }
        tx.parties.create(party)
    }

    pub fn update(tx: &mut Transaction<'_>, party: Party) -> Result<()> {
        if !tx.parties.exists(&party.id) {
            return Err(BookkeepingError::PartyNotFound(party.id));
        }
        tx.parties.update(party)
    }

    /// Deletes a party that has no invoices.
    pub fn remove(tx: &mut Transaction<'_>, id: &str) -> Result<Party> {
        if !tx.parties.exists(&id.to_string()) {
            return Err(BookkeepingError::PartyNotFound(id.to_string()));
        }
        if tx.invoices.iter().any(|invoice| invoice.party_id == id) {
            return Err(BookkeepingError::PartyInUse(id.to_string()));
        }
        tx.parties.delete(&id.to_string())
    }

    pub fn find<'a>(tables: &'a Tables, id: &str) -> Result<&'a Party> {
        tables
            .parties
            .find(&id.to_string())
            .ok_or_else(|| BookkeepingError::PartyNotFound(id.to_string()))
    }

    pub fn list(tables: &Tables) -> Vec<&Party> {
        tables.parties.iter().collect()
    }

    /// Parties whose tags satisfy `criterion`, ordered by id.
    pub fn matching<'a>(tables: &'a Tables, criterion: &Criterion) -> Vec<&'a Party> {
        tables
            .parties
            .find_all(|party| criterion.matches(&party.tags))
    }

    /// Every tag in use, lowercased and sorted.
    pub fn tags(tables: &Tables) -> Vec<String> {
        tables
            .parties
            .iter()
            .flat_map(|party| party.tags.iter().map(|tag| tag.to_lowercase()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
