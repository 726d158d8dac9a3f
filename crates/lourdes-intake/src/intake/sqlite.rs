use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};

use super::domain::{Enquiry, EnquiryId, NewEnquiry};
use super::repository::{EnquiryRepository, StorageError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS enquiries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    client_ip TEXT,
    created_at TEXT NOT NULL
);
";

/// Durable submission store backed by a single SQLite file.
///
/// One connection behind a mutex; every repository method runs a single
/// implicit transaction, so an insert is atomic and `count` never observes a
/// partial write. Timestamps are clamped against the previous insert so
/// `created_at` is non-decreasing in insertion order even if the wall clock
/// steps backwards.
#[derive(Debug)]
pub struct SqliteEnquiryRepository {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    connection: Connection,
    last_created_at: Option<DateTime<Utc>>,
}

impl SqliteEnquiryRepository {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let connection = Connection::open(path)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        Self::initialize(connection)
    }

    /// Process-local store for tests; contents vanish on drop.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let connection = Connection::open_in_memory()
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        Self::initialize(connection)
    }

    /// Reader for out-of-band tooling. A missing or unreadable database is
    /// `StorageError::Unavailable` rather than a silently created empty
    /// store, so a mistyped path can never masquerade as a zero count.
    pub fn open_read_only(path: &Path) -> Result<Self, StorageError> {
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        connection
            .execute_batch("PRAGMA busy_timeout=5000;")
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;

        let last_created_at = latest_timestamp(&connection)?;

        Ok(Self {
            inner: Mutex::new(Inner {
                connection,
                last_created_at,
            }),
        })
    }

    fn initialize(connection: Connection) -> Result<Self, StorageError> {
        connection
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        connection
            .execute_batch(SCHEMA)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;

        let last_created_at = latest_timestamp(&connection)?;

        Ok(Self {
            inner: Mutex::new(Inner {
                connection,
                last_created_at,
            }),
        })
    }
}

fn latest_timestamp(connection: &Connection) -> Result<Option<DateTime<Utc>>, StorageError> {
    let raw: Option<String> = connection
        .query_row(
            "SELECT created_at FROM enquiries ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(StorageError::Query(other.to_string())),
        })?;

    raw.map(|value| parse_timestamp(&value)).transpose()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| StorageError::Query(format!("corrupt created_at '{raw}': {err}")))
}

fn row_to_enquiry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Enquiry> {
    let rowid: u64 = row.get(0)?;
    let created_at: String = row.get(7)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })?;

    Ok(Enquiry {
        id: EnquiryId::from_sequence(rowid),
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        subject: row.get(4)?,
        message: row.get(5)?,
        client_ip: row.get(6)?,
        created_at,
    })
}

impl EnquiryRepository for SqliteEnquiryRepository {
    fn insert(&self, enquiry: NewEnquiry) -> Result<Enquiry, StorageError> {
        let mut inner = self.inner.lock().expect("sqlite mutex poisoned");

        let now = Utc::now();
        let created_at = match inner.last_created_at {
            Some(previous) if previous > now => previous,
            _ => now,
        };

        inner
            .connection
            .execute(
                "INSERT INTO enquiries (name, email, phone, subject, message, client_ip, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    enquiry.name,
                    enquiry.email,
                    enquiry.phone,
                    enquiry.subject,
                    enquiry.message,
                    enquiry.client_ip,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(|err| StorageError::Query(err.to_string()))?;

        let rowid = inner.connection.last_insert_rowid() as u64;
        inner.last_created_at = Some(created_at);

        Ok(Enquiry::from_new(
            EnquiryId::from_sequence(rowid),
            enquiry,
            created_at,
        ))
    }

    fn count(&self) -> Result<u64, StorageError> {
        let inner = self.inner.lock().expect("sqlite mutex poisoned");
        inner
            .connection
            .query_row("SELECT COUNT(*) FROM enquiries", [], |row| row.get(0))
            .map_err(|err| StorageError::Query(err.to_string()))
    }

    fn recent(&self, limit: usize) -> Result<Vec<Enquiry>, StorageError> {
        let inner = self.inner.lock().expect("sqlite mutex poisoned");
        let mut statement = inner
            .connection
            .prepare(
                "SELECT id, name, email, phone, subject, message, client_ip, created_at
                 FROM enquiries ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|err| StorageError::Query(err.to_string()))?;

        let rows = statement
            .query_map(params![limit as i64], row_to_enquiry)
            .map_err(|err| StorageError::Query(err.to_string()))?;

        let mut enquiries = Vec::new();
        for row in rows {
            enquiries.push(row.map_err(|err| StorageError::Query(err.to_string()))?);
        }
        Ok(enquiries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(subject: &str) -> NewEnquiry {
        NewEnquiry {
            name: "Buyer".to_string(),
            email: "buyer@example.com".to_string(),
            phone: None,
            subject: subject.to_string(),
            message: "Shipment enquiry".to_string(),
            client_ip: Some("203.0.113.9".to_string()),
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let repo = SqliteEnquiryRepository::open_in_memory().expect("open");
        let first = repo.insert(sample("first")).expect("insert");
        let second = repo.insert(sample("second")).expect("insert");
        assert_eq!(first.id.0, "enq-000001");
        assert_eq!(second.id.0, "enq-000002");
        assert_eq!(repo.count().expect("count"), 2);
    }

    #[test]
    fn recent_returns_newest_first() {
        let repo = SqliteEnquiryRepository::open_in_memory().expect("open");
        for subject in ["a", "b", "c"] {
            repo.insert(sample(subject)).expect("insert");
        }
        let recent = repo.recent(2).expect("recent");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].subject, "c");
        assert_eq!(recent[1].subject, "b");
    }

    #[test]
    fn created_at_is_non_decreasing() {
        let repo = SqliteEnquiryRepository::open_in_memory().expect("open");
        let mut previous = None;
        for subject in ["a", "b", "c", "d"] {
            let stored = repo.insert(sample(subject)).expect("insert");
            if let Some(previous) = previous {
                assert!(stored.created_at >= previous);
            }
            previous = Some(stored.created_at);
        }
    }
}
