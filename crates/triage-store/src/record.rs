//! On-disk record shapes.
//!
//! Stored files are a JSON array of request objects.  Enumerated fields are
//! read as plain strings first and then parsed by the core, so a corrupt
//! value surfaces as a typed [`TriageError`] (`InvalidState` for an unknown
//! status) instead of an opaque serde message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use triage_core::{
    Channel, Department, LifecycleState, Priority, Request, RequestParts, RequesterType,
    TriageError,
};

/// A persisted request as it appears in the store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRequest {
    pub id: u64,
    pub channel: String,
    pub requester_type: String,
    pub summary: String,
    pub description: String,
    pub priority: String,
    pub department: String,
    pub category: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRequest {
    /// Parse every field and rebuild a validated [`Request`].
    ///
    /// Enumerated fields must carry their exact canonical names.
    pub fn into_request(self) -> Result<Request, TriageError> {
        Request::from_parts(RequestParts {
            id: self.id,
            channel: Channel::from_canonical(&self.channel)?,
            requester_type: RequesterType::from_canonical(&self.requester_type)?,
            summary: self.summary,
            description: self.description,
            priority: Priority::from_canonical(&self.priority)?,
            department: Department::from_canonical(&self.department)?,
            category: self.category,
            status: LifecycleState::from_canonical(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A sample request to seed a store with.
///
/// Seeds carry only submitter fields; classification happens on import.
/// `id` is assigned when absent and `status` defaults to `NEW`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRequest {
    #[serde(default)]
    pub id: Option<u64>,
    pub channel: String,
    pub requester_type: String,
    pub summary: String,
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl SeedRequest {
    /// The seed's status, or the initial state when it has none.
    pub fn lifecycle_state(&self) -> Result<LifecycleState, TriageError> {
        self.status
            .as_deref()
            .map_or(Ok(LifecycleState::INITIAL), LifecycleState::from_canonical)
    }

    pub fn channel(&self) -> Result<Channel, TriageError> {
        Channel::from_canonical(&self.channel)
    }

    pub fn requester_type(&self) -> Result<RequesterType, TriageError> {
        RequesterType::from_canonical(&self.requester_type)
    }
}
