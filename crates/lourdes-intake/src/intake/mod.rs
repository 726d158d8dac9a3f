//! Contact enquiry submission pipeline.
//!
//! Flow: raw request body -> [`validation`] -> [`EnquiryRepository::insert`]
//! -> best-effort [`EnquiryNotifier::notify`]. Validation is pure and never
//! touches the store; the store is the only shared mutable resource and does
//! its own locking, so nothing here holds a lock across an await point.

pub mod domain;
pub mod limiter;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;
pub mod sqlite;
pub mod validation;

pub use domain::{Enquiry, EnquiryId, NewEnquiry};
pub use limiter::{RateLimitConfig, SubmissionRateLimiter};
pub use notify::{EnquiryNotifier, LogNotifier, NotifyError};
pub use repository::{EnquiryRepository, StorageError};
pub use router::intake_router;
pub use service::{EnquiryIntakeService, IntakeError};
pub use sqlite::SqliteEnquiryRepository;
pub use validation::{validate_payload, IntakePolicy, ValidationError};
