use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque store-assigned identifier, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnquiryId(pub String);

impl EnquiryId {
    /// Public id derived from the store's internal sequence number.
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("enq-{sequence:06}"))
    }
}

impl std::fmt::Display for EnquiryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated, sanitized enquiry fields awaiting insertion.
///
/// Produced exclusively by [`super::validation::validate_payload`]; the
/// service fills `client_ip` from request headers before handing the value
/// to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub client_ip: Option<String>,
}

/// A persisted enquiry record. Append-only: once stored it is never mutated
/// and no delete operation exists on the repository contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: EnquiryId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Enquiry {
    pub fn from_new(id: EnquiryId, new: NewEnquiry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            subject: new.subject,
            message: new.message,
            client_ip: new.client_ip,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enquiry_id_is_zero_padded() {
        assert_eq!(EnquiryId::from_sequence(7).0, "enq-000007");
        assert_eq!(EnquiryId::from_sequence(1_234_567).0, "enq-1234567");
    }

    #[test]
    fn serialized_enquiry_omits_absent_optionals() {
        let enquiry = Enquiry::from_new(
            EnquiryId::from_sequence(1),
            NewEnquiry {
                name: "Maria".to_string(),
                email: "maria@example.com".to_string(),
                phone: None,
                subject: "Wholesale".to_string(),
                message: "Pricing for jackfruit pallets".to_string(),
                client_ip: None,
            },
            Utc::now(),
        );

        let value = serde_json::to_value(&enquiry).expect("serializes");
        assert!(value.get("phone").is_none());
        assert!(value.get("client_ip").is_none());
        assert_eq!(value["id"], "enq-000001");
    }
}
