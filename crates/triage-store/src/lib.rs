//! # triage-store
//!
//! Owned, in-memory collection of service requests with JSON file
//! persistence.
//!
//! ## Quick start
//!
//! ```ignore
//! use std::path::Path;
//! use triage_core::{Classifier, SystemClock, WorkflowTracker};
//! use triage_store::RequestStore;
//!
//! let path = Path::new("data/requests.json");
//! let mut store = RequestStore::open(path)?;
//! let classifier = Classifier::builtin()?;
//! let id = store.create(new_request, &classifier, &SystemClock)?.id();
//! store.advance(id, &WorkflowTracker::new())?;
//! store.save(path)?;
//! ```

pub mod error;
pub mod record;
pub mod store;

// ── re-exports ───────────────────────────────────────────────────────

pub use error::{StoreError, StoreResult};
pub use record::{SeedRequest, StoredRequest};
pub use store::{RequestFilter, RequestStore, load_seeds};
