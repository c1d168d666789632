//! Plain bookkeeping records shared by the services, storage and report layers.

pub mod account;
pub mod amount;
pub mod bookkeeping;
pub mod invoice;
pub mod journal;
pub mod party;
pub mod report;

pub use account::{Account, AccountKind, AccountType};
pub use amount::Amount;
pub use bookkeeping::Bookkeeping;
pub use invoice::{Invoice, InvoiceOverview, Payment};
pub use journal::{JournalEntry, JournalEntryDetail, JournalEntryWithDetails, Totals};
pub use party::Party;
pub use report::{LedgerLine, Report};
