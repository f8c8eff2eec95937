//! Service request data model.
//!
//! A [`Request`] is created once from submitter-supplied fields plus a
//! [`Classification`], and afterwards only its lifecycle status and
//! `updated_at` stamp change, through [`crate::WorkflowTracker`].  Fields are
//! private so no other caller can bypass that contract.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Classification;
use crate::error::{Result, TriageError};
use crate::workflow::LifecycleState;

// ---------------------------------------------------------------------------
// Enumerated fields
// ---------------------------------------------------------------------------

/// Lowercase a label and drop separators so `Walk-in`, `walk_in` and
/// `WALKIN` compare equal.
fn normalize_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// How a request was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "Phone")]
    Phone,
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "Walk-in")]
    WalkIn,
    #[serde(rename = "Resident Portal", alias = "Portal")]
    Portal,
}

impl Channel {
    pub const ALL: [Self; 4] = [Self::Phone, Self::Email, Self::WalkIn, Self::Portal];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::WalkIn => "Walk-in",
            Self::Portal => "Resident Portal",
        }
    }
}

impl FromStr for Channel {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "walkin" => Ok(Self::WalkIn),
            "portal" | "residentportal" => Ok(Self::Portal),
            _ => Err(TriageError::InvalidField {
                field: "channel",
                value: s.to_string(),
            }),
        }
    }
}

/// Who submitted the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequesterType {
    Resident,
    Employee,
}

impl RequesterType {
    pub const ALL: [Self; 2] = [Self::Resident, Self::Employee];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resident => "Resident",
            Self::Employee => "Employee",
        }
    }
}

impl FromStr for RequesterType {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "resident" => Ok(Self::Resident),
            "employee" => Ok(Self::Employee),
            _ => Err(TriageError::InvalidField {
                field: "requester type",
                value: s.to_string(),
            }),
        }
    }
}

/// Handling urgency assigned by the classifier.
///
/// Variants are declared most-urgent first, so the derived `Ord` sorts
/// `High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(TriageError::InvalidField {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// The team responsible for handling a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Public Works", alias = "PublicWorks")]
    PublicWorks,
    #[serde(rename = "Licensing")]
    Licensing,
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "HR")]
    Hr,
    #[serde(rename = "General Services", alias = "GeneralServices")]
    GeneralServices,
}

impl Department {
    pub const ALL: [Self; 5] = [
        Self::PublicWorks,
        Self::Licensing,
        Self::It,
        Self::Hr,
        Self::GeneralServices,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PublicWorks => "Public Works",
            Self::Licensing => "Licensing",
            Self::It => "IT",
            Self::Hr => "HR",
            Self::GeneralServices => "General Services",
        }
    }
}

impl FromStr for Department {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "publicworks" => Ok(Self::PublicWorks),
            "licensing" => Ok(Self::Licensing),
            "it" => Ok(Self::It),
            "hr" => Ok(Self::Hr),
            "generalservices" => Ok(Self::GeneralServices),
            _ => Err(TriageError::InvalidField {
                field: "department",
                value: s.to_string(),
            }),
        }
    }
}

/// `Display` through `as_str`, plus `from_canonical`, the strict parse used
/// for persisted records.  `FromStr` stays lenient for typed-in values.
macro_rules! canonical_labels {
    ($($ty:ty => $field:literal),+ $(,)?) => {
        $(
            impl $ty {
                /// Parse the exact display name, as written to store files.
                pub fn from_canonical(s: &str) -> Result<Self> {
                    Self::ALL
                        .into_iter()
                        .find(|v| v.as_str() == s)
                        .ok_or_else(|| TriageError::InvalidField {
                            field: $field,
                            value: s.to_string(),
                        })
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.pad(self.as_str())
                }
            }
        )+
    };
}

canonical_labels!(
    Channel => "channel",
    RequesterType => "requester type",
    Priority => "priority",
    Department => "department",
);

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Submitter-supplied fields for a new request.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub channel: Channel,
    pub requester_type: RequesterType,
    pub summary: String,
    pub description: String,
}

/// Every field of a request, used to rebuild one from storage.
///
/// [`Request::from_parts`] checks the record invariants before handing back
/// a [`Request`].
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub id: u64,
    pub channel: Channel,
    pub requester_type: RequesterType,
    pub summary: String,
    pub description: String,
    pub priority: Priority,
    pub department: Department,
    pub category: String,
    pub status: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single service request tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    id: u64,
    channel: Channel,
    requester_type: RequesterType,
    summary: String,
    description: String,
    priority: Priority,
    department: Department,
    category: String,
    status: LifecycleState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Request {
    /// Create a request in the `NEW` state with both timestamps set to `now`.
    pub fn create(
        id: u64,
        new: NewRequest,
        classification: &Classification,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            channel: new.channel,
            requester_type: new.requester_type,
            summary: new.summary,
            description: new.description,
            priority: classification.priority,
            department: classification.department,
            category: classification.category.clone(),
            status: LifecycleState::New,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a request from previously stored fields.
    ///
    /// Fails with [`TriageError::InvalidRecord`] when the category is empty
    /// or `updated_at` precedes `created_at`.
    pub fn from_parts(parts: RequestParts) -> Result<Self> {
        if parts.category.trim().is_empty() {
            return Err(TriageError::InvalidRecord {
                id: parts.id,
                reason: "category is empty".into(),
            });
        }
        if parts.updated_at < parts.created_at {
            return Err(TriageError::InvalidRecord {
                id: parts.id,
                reason: format!(
                    "updated_at {} precedes created_at {}",
                    parts.updated_at.to_rfc3339(),
                    parts.created_at.to_rfc3339()
                ),
            });
        }

        Ok(Self {
            id: parts.id,
            channel: parts.channel,
            requester_type: parts.requester_type,
            summary: parts.summary,
            description: parts.description,
            priority: parts.priority,
            department: parts.department,
            category: parts.category,
            status: parts.status,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn requester_type(&self) -> RequesterType {
        self.requester_type
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn department(&self) -> Department {
        self.department
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn status(&self) -> LifecycleState {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move to `status`, stamping `at`.  Only the workflow tracker calls this.
    pub(crate) fn transition(&mut self, status: LifecycleState, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
