use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::domain::Enquiry;
use super::limiter::SubmissionRateLimiter;
use super::notify::EnquiryNotifier;
use super::repository::{EnquiryRepository, StorageError};
use super::validation::{validate_payload, IntakePolicy, ValidationError};

/// Facade composing the rate limiter, validator, repository, and notifier.
///
/// Holds no per-request state; a single instance is shared across all
/// concurrent handlers behind an `Arc`.
pub struct EnquiryIntakeService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    limiter: SubmissionRateLimiter,
    policy: IntakePolicy,
}

impl<R, N> EnquiryIntakeService<R, N>
where
    R: EnquiryRepository + 'static,
    N: EnquiryNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self::with_policy(
            repository,
            notifier,
            SubmissionRateLimiter::default(),
            IntakePolicy::default(),
        )
    }

    pub fn with_policy(
        repository: Arc<R>,
        notifier: Arc<N>,
        limiter: SubmissionRateLimiter,
        policy: IntakePolicy,
    ) -> Self {
        Self {
            repository,
            notifier,
            limiter,
            policy,
        }
    }

    /// Run the full intake pipeline over a raw request body.
    ///
    /// Order matters: the limiter is consulted before any parse work, the
    /// store is only touched after validation passes, and exactly one record
    /// is written per successful call. Identical payloads are deliberately
    /// not deduplicated.
    pub fn submit(&self, body: &[u8], client_ip: &str) -> Result<Enquiry, IntakeError> {
        if !self.limiter.allow(client_ip) {
            return Err(IntakeError::RateLimited);
        }

        let document: Value =
            serde_json::from_slice(body).map_err(|_| IntakeError::MalformedRequest)?;
        let payload = document.as_object().ok_or(IntakeError::MalformedRequest)?;

        let mut enquiry = validate_payload(payload, &self.policy)?;
        enquiry.client_ip = Some(client_ip.to_string());

        let stored = self.repository.insert(enquiry)?;

        if let Err(err) = self.notifier.notify(&stored) {
            warn!(id = %stored.id, error = %err, "enquiry notification failed");
        }

        Ok(stored)
    }

    /// Most recent enquiries for the admin listing, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<Enquiry>, StorageError> {
        self.repository.recent(limit)
    }

    pub fn count(&self) -> Result<u64, StorageError> {
        self.repository.count()
    }
}

/// Error raised by the intake pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("too many submissions from this address")]
    RateLimited,
    #[error("request body is not a JSON object")]
    MalformedRequest,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
