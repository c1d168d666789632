pub mod account_service;
pub mod invoice_service;
pub mod ledger_service;
pub mod party_service;
pub mod report_service;

pub use account_service::AccountService;
pub use invoice_service::{InvoiceService, InvoiceTemplate, InvoiceTemplateLine};
pub use ledger_service::LedgerService;
pub use party_service::PartyService;
pub use report_service::ReportService;

/// Receives coarse progress (0, then 100 at the end of each phase) from long operations.
pub trait ProgressListener {
    fn on_progress(&mut self, percentage: u8);
}

impl<F: FnMut(u8)> ProgressListener for F {
    fn on_progress(&mut self, percentage: u8) {
        self(percentage)
    }
}

/// Progress listener that ignores all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn on_progress(&mut self, _percentage: u8) {}
}

#[cfg(test)]
mod tests;
