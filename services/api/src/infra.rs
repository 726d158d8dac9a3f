use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use lourdes_intake::intake::{Enquiry, EnquiryId, EnquiryRepository, NewEnquiry, StorageError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Development-mode submission store used when no database path is
/// configured. Contents are lost on restart, so the count check refuses to
/// run against it.
#[derive(Default)]
pub(crate) struct InMemoryEnquiryRepository {
    state: Mutex<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    records: Vec<Enquiry>,
    sequence: u64,
}

impl EnquiryRepository for InMemoryEnquiryRepository {
    fn insert(&self, enquiry: NewEnquiry) -> Result<Enquiry, StorageError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state.sequence += 1;
        let now = Utc::now();
        // Clamp so created_at never runs backwards within the process.
        let created_at = match state.records.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let stored = Enquiry::from_new(
            EnquiryId::from_sequence(state.sequence),
            enquiry,
            created_at,
        );
        state.records.push(stored.clone());
        Ok(stored)
    }

    fn count(&self) -> Result<u64, StorageError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.records.len() as u64)
    }

    fn recent(&self, limit: usize) -> Result<Vec<Enquiry>, StorageError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.records.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enquiry(subject: &str) -> NewEnquiry {
        NewEnquiry {
            name: "Buyer".to_string(),
            email: "buyer@example.com".to_string(),
            phone: None,
            subject: subject.to_string(),
            message: "Shipment enquiry".to_string(),
            client_ip: None,
        }
    }

    #[test]
    fn assigns_sequential_ids_and_counts_inserts() {
        let repo = InMemoryEnquiryRepository::default();
        let first = repo.insert(enquiry("a")).expect("insert");
        let second = repo.insert(enquiry("b")).expect("insert");
        assert_eq!(first.id.0, "enq-000001");
        assert_eq!(second.id.0, "enq-000002");
        assert_eq!(repo.count().expect("count"), 2);
        assert!(second.created_at >= first.created_at);
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let repo = InMemoryEnquiryRepository::default();
        for subject in ["a", "b", "c"] {
            repo.insert(enquiry(subject)).expect("insert");
        }
        let recent = repo.recent(2).expect("recent");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].subject, "c");
        assert_eq!(recent[1].subject, "b");
    }
}
