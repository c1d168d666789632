//! In-memory bookkeeping document with keyed tables, transactions and change listeners.

use std::{
    collections::BTreeMap,
    fmt::{Debug, Display},
    ops::{Deref, DerefMut, RangeBounds},
    path::{Path, PathBuf},
    sync::mpsc::Sender,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::errors::{BookkeepingError, Result};
use crate::domain::{Account, Bookkeeping, Invoice, JournalEntry, JournalEntryDetail, Party};
use crate::storage::StorageBackend;

/// A persisted record type with a unique key.
pub trait Row: Clone + Debug + Serialize + DeserializeOwned {
    type Key: Ord + Clone + Debug + Display;
    const TABLE: &'static str;

    fn key(&self) -> Self::Key;
}

impl Row for Account {
    type Key = String;
    const TABLE: &'static str = "Account";

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Row for Party {
    type Key = String;
    const TABLE: &'static str = "Party";

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Row for Invoice {
    type Key = String;
    const TABLE: &'static str = "Invoice";

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Row for JournalEntry {
    type Key = String;
    const TABLE: &'static str = "Journal entry";

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Composite key of a journal entry line: owning entry id and line number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DetailKey(pub String, pub u32);

impl Display for DetailKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.0, self.1)
    }
}

impl Row for JournalEntryDetail {
    type Key = DetailKey;
    const TABLE: &'static str = "Journal entry detail";

    fn key(&self) -> DetailKey {
        DetailKey(self.journal_entry_id.clone(), self.line)
    }
}

/// Keyed rows of one record type, serialized as a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "R: Row", from = "Vec<R>", into = "Vec<R>")]
pub struct Table<R: Row> {
    rows: BTreeMap<R::Key, R>,
}

impl<R: Row> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<R: Row> From<Vec<R>> for Table<R> {
    fn from(rows: Vec<R>) -> Self {
        Self {
            rows: rows.into_iter().map(|row| (row.key(), row)).collect(),
        }
    }
}

impl<R: Row> From<Table<R>> for Vec<R> {
    fn from(table: Table<R>) -> Self {
        table.rows.into_values().collect()
    }
}

impl<R: Row> Table<R> {
    pub fn create(&mut self, row: R) -> Result<()> {
        let key = row.key();
        if self.rows.contains_key(&key) {
            return Err(BookkeepingError::DuplicateKey {
                table: R::TABLE,
                key: key.to_string(),
            });
        }
        self.rows.insert(key, row);
        Ok(())
    }

    pub fn update(&mut self, row: R) -> Result<()> {
        let key = row.key();
        match self.rows.get_mut(&key) {
            Some(existing) => {
                *existing = row;
                Ok(())
            }
            None => Err(BookkeepingError::MissingKey {
                table: R::TABLE,
                key: key.to_string(),
            }),
        }
    }

    pub fn delete(&mut self, key: &R::Key) -> Result<R> {
        self.rows.remove(key).ok_or_else(|| BookkeepingError::MissingKey {
            table: R::TABLE,
            key: key.to_string(),
        })
    }

    pub fn find(&self, key: &R::Key) -> Option<&R> {
        self.rows.get(key)
    }

    pub fn exists(&self, key: &R::Key) -> bool {
        self.rows.contains_key(key)
    }

    /// Rows matching `filter`, in key order.
    pub fn find_all<F>(&self, filter: F) -> Vec<&R>
    where
        F: Fn(&R) -> bool,
    {
        self.rows.values().filter(|row| filter(row)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    /// Rows whose keys fall within `range`, in key order.
    pub fn range<B>(&self, range: B) -> impl Iterator<Item = &R>
    where
        B: RangeBounds<R::Key>,
    {
        self.rows.range(range).map(|(_, row)| row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deletes every row matching `filter`, returning how many were removed.
    pub fn delete_where<F>(&mut self, filter: F) -> usize
    where
        F: Fn(&R) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|_, row| !filter(row));
        before - self.rows.len()
    }
}

/// All tables of one bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub bookkeeping: Bookkeeping,
    #[serde(default)]
    pub accounts: Table<Account>,
    #[serde(default)]
    pub parties: Table<Party>,
    #[serde(default)]
    pub invoices: Table<Invoice>,
    #[serde(default)]
    pub journal_entries: Table<JournalEntry>,
    #[serde(default)]
    pub journal_entry_details: Table<JournalEntryDetail>,
}

impl Tables {
    pub fn new(bookkeeping: Bookkeeping) -> Self {
        Self {
            bookkeeping,
            ..Self::default()
        }
    }

    /// Lines of a journal entry in line order.
    pub fn details_of(&self, journal_entry_id: &str) -> Vec<&JournalEntryDetail> {
        let first = DetailKey(journal_entry_id.to_string(), 0);
        let last = DetailKey(journal_entry_id.to_string(), u32::MAX);
        self.journal_entry_details.range(first..=last).collect()
    }
}

/// Scoped unit of work over a document's tables.
///
/// Dropping a transaction without committing restores the tables as they were
/// when it began. Service calls receive `&mut Transaction` so nested calls
/// join the caller's transaction.
pub struct Transaction<'a> {
    tables: &'a mut Tables,
    snapshot: Option<Tables>,
    changed: bool,
}

impl<'a> Transaction<'a> {
    fn begin(tables: &'a mut Tables) -> Self {
        let snapshot = Some(tables.clone());
        Self {
            tables,
            snapshot,
            changed: false,
        }
    }

    /// True once any table was borrowed mutably.
    pub fn has_changes(&self) -> bool {
        self.changed
    }

    /// Keeps the changes and hands back the pre-transaction state for a late rollback.
    fn commit(mut self) -> (Tables, bool) {
        let snapshot = self.snapshot.take().unwrap_or_default();
        (snapshot, self.changed)
    }
}

impl Deref for Transaction<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        self.tables
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Tables {
        self.changed = true;
        self.tables
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!("rolling back transaction");
            *self.tables = snapshot;
        }
    }
}

/// Receives a notification after every committed change to a document.
pub trait DocumentListener {
    fn document_changed(&mut self, revision: u64, document: &Tables);
}

/// Forwards change notifications as messages, for subscribers on another thread.
pub struct ChannelListener(pub Sender<DocumentChanged>);

/// Message sent by [`ChannelListener`] after a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChanged {
    pub revision: u64,
}

impl DocumentListener for ChannelListener {
    fn document_changed(&mut self, revision: u64, _document: &Tables) {
        // A closed receiver just means nobody listens anymore.
        let _ = self.0.send(DocumentChanged { revision });
    }
}

/// One open bookkeeping: its tables, optional backing file and listeners.
pub struct Document {
    tables: Tables,
    file: Option<(PathBuf, Box<dyn StorageBackend>)>,
    listeners: Vec<Box<dyn DocumentListener>>,
    revision: u64,
}

impl Document {
    /// Creates a document that lives in memory only.
    pub fn new(bookkeeping: Bookkeeping) -> Self {
        Self::from_tables(Tables::new(bookkeeping))
    }

    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables,
            file: None,
            listeners: Vec::new(),
            revision: 0,
        }
    }

    /// Opens a document from `path`, persisting every commit back to it.
    pub fn open(path: &Path, storage: Box<dyn StorageBackend>) -> Result<Self> {
        let tables = storage.load(path)?;
        info!(path = %path.display(), "opened bookkeeping");
        let mut document = Self::from_tables(tables);
        document.file = Some((path.to_path_buf(), storage));
        Ok(document)
    }

    /// Attaches a backing file and writes the current state to it.
    pub fn save_as(&mut self, path: &Path, storage: Box<dyn StorageBackend>) -> Result<()> {
        storage.save(&self.tables, path)?;
        self.file = Some((path.to_path_buf(), storage));
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Number of committed transactions that changed the document.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add_listener(&mut self, listener: Box<dyn DocumentListener>) {
        self.listeners.push(listener);
    }

    /// Runs `work` in a transaction.
    ///
    /// On success the changes are persisted (if the document has a backing file)
    /// and listeners are notified in registration order. On error, or if
    /// persisting fails, the tables are restored to their previous state.
    pub fn in_transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let (value, snapshot, changed) = {
            let mut transaction = Transaction::begin(&mut self.tables);
            let value = work(&mut transaction)?;
            let (snapshot, changed) = transaction.commit();
            (value, snapshot, changed)
        };
        if !changed {
            return Ok(value);
        }
        if let Some((path, storage)) = self.file.as_ref() {
            if let Err(err) = storage.save(&self.tables, path) {
                debug!(error = %err, "persisting failed, rolling back");
                self.tables = snapshot;
                return Err(err);
            }
        }
        self.revision += 1;
        info!(revision = self.revision, "committed bookkeeping changes");
        for listener in self.listeners.iter_mut() {
            listener.document_changed(self.revision, &self.tables);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, sync::mpsc};

    use super::*;
    use crate::domain::AccountType;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl DocumentListener for Recorder {
        fn document_changed(&mut self, _revision: u64, document: &Tables) {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.name, document.accounts.len()));
        }
    }

    fn cash() -> Account {
        Account::new("100", "Kas", AccountType::ASSET)
    }

    #[test]
    fn table_enforces_keys() {
        let mut table = Table::default();
        table.create(cash()).unwrap();
        assert!(matches!(
            table.create(cash()),
            Err(BookkeepingError::DuplicateKey { table: "Account", .. })
        ));
        assert!(matches!(
            table.update(Account::new("999", "x", AccountType::ASSET)),
            Err(BookkeepingError::MissingKey { .. })
        ));
        assert!(table.delete(&"100".to_string()).is_ok());
        assert!(table.is_empty());
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let mut document = Document::new(Bookkeeping::default());
        let result: Result<()> = document.in_transaction(|tx| {
            tx.accounts.create(cash())?;
            Err(BookkeepingError::Validation("boom".into()))
        });
        assert!(result.is_err());
        assert!(document.tables().accounts.is_empty());
        assert_eq!(document.revision(), 0);
    }

    #[test]
    fn listeners_run_in_registration_order_after_commit() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut document = Document::new(Bookkeeping::default());
        document.add_listener(Box::new(Recorder {
            name: "first",
            log: Rc::clone(&log),
        }));
        document.add_listener(Box::new(Recorder {
            name: "second",
            log: Rc::clone(&log),
        }));

        document
            .in_transaction(|tx| tx.accounts.create(cash()))
            .unwrap();
        assert_eq!(*log.borrow(), vec!["first:1", "second:1"]);

        document.in_transaction(|tx| Ok(tx.accounts.len())).unwrap();
        assert_eq!(log.borrow().len(), 2, "read-only work does not notify");
    }

    #[test]
    fn channel_listener_forwards_changes() {
        let (sender, receiver) = mpsc::channel();
        let mut document = Document::new(Bookkeeping::default());
        document.add_listener(Box::new(ChannelListener(sender)));
        document
            .in_transaction(|tx| tx.accounts.create(cash()))
            .unwrap();
        assert_eq!(receiver.try_recv(), Ok(DocumentChanged { revision: 1 }));
    }

    #[test]
    fn serializes_tables_as_lists() {
        let mut tables = Tables::default();
        tables.accounts.create(cash()).unwrap();
        let json = serde_json::to_value(&tables).unwrap();
        assert!(json["accounts"].is_array());
        let restored: Tables = serde_json::from_value(json).unwrap();
        assert!(restored.accounts.exists(&"100".to_string()));
    }
}
