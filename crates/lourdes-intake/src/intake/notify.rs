use tracing::info;

use super::domain::Enquiry;

/// Outbound notification hook fired after a successful insert.
///
/// Best-effort by contract: the service logs a failure and still confirms
/// the submission to the caller. Adapters for hosted mail providers plug in
/// here; the default implementation only writes to the log.
pub trait EnquiryNotifier: Send + Sync {
    fn notify(&self, enquiry: &Enquiry) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Tracing-backed notifier used when no mail provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl EnquiryNotifier for LogNotifier {
    fn notify(&self, enquiry: &Enquiry) -> Result<(), NotifyError> {
        info!(
            id = %enquiry.id,
            from = %enquiry.email,
            subject = %enquiry.subject,
            "enquiry received"
        );
        Ok(())
    }
}
