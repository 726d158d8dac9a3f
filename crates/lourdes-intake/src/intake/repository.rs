use super::domain::{Enquiry, NewEnquiry};

/// Storage abstraction for the submission store.
///
/// Append-and-count only: the contract exposes no update or delete. `insert`
/// assigns the id and timestamp, and either fully succeeds or fully fails;
/// `count` reflects exactly the inserts that returned success. Methods are
/// synchronous so callers never hold a connection lock across an await.
pub trait EnquiryRepository: Send + Sync {
    fn insert(&self, enquiry: NewEnquiry) -> Result<Enquiry, StorageError>;
    fn count(&self) -> Result<u64, StorageError>;
    /// Most recent records, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<Enquiry>, StorageError>;
}

/// Infrastructure failures only. Payload shape problems are rejected by
/// validation long before a repository sees them.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("submission store unavailable: {0}")]
    Unavailable(String),
    #[error("submission store query failed: {0}")]
    Query(String),
}
