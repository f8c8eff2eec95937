//! The request store, single owner of every request record.
//!
//! Records live in memory in creation order and are persisted as a JSON
//! array.  The store is the only caller that holds `&mut Request`, so each
//! advance is applied to exactly one record at a time.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, instrument};

use triage_core::{
    AdvanceOutcome, Classifier, Clock, Department, LifecycleState, NewRequest, Priority, Request,
    RequestParts, WorkflowTracker,
};

use crate::error::{StoreError, StoreResult};
use crate::record::{SeedRequest, StoredRequest};

// ═══════════════════════════════════════════════════════════════════════
//  Filters
// ═══════════════════════════════════════════════════════════════════════

/// Optional constraints for [`RequestStore::filter`].  `None` matches all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub department: Option<Department>,
    pub status: Option<LifecycleState>,
}

impl RequestFilter {
    pub fn matches(&self, request: &Request) -> bool {
        self.department.is_none_or(|d| request.department() == d)
            && self.status.is_none_or(|s| request.status() == s)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  RequestStore
// ═══════════════════════════════════════════════════════════════════════

/// Owned collection of requests keyed by id.
#[derive(Debug, Default)]
pub struct RequestStore {
    requests: Vec<Request>,
}

impl RequestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing requests, rejecting duplicate ids.
    pub fn from_requests(requests: Vec<Request>) -> StoreResult<Self> {
        let mut store = Self::new();
        for request in requests {
            if store.get(request.id()).is_some() {
                return Err(StoreError::DuplicateId(request.id()));
            }
            store.requests.push(request);
        }
        Ok(store)
    }

    /// Load a store file written by [`RequestStore::save`].
    #[instrument]
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let records: Vec<StoredRequest> = serde_json::from_str(&content)?;
        let requests = records
            .into_iter()
            .map(StoredRequest::into_request)
            .collect::<Result<Vec<_>, _>>()?;

        let store = Self::from_requests(requests)?;
        info!(path = %path.display(), count = store.len(), "request store loaded");
        Ok(store)
    }

    /// Load `path`, or start empty when the file does not exist yet.
    pub fn open(path: &Path) -> StoreResult<Self> {
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no store file yet, starting empty");
                Ok(Self::new())
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Write every record to `path` as a pretty-printed JSON array.
    ///
    /// The data is written to a sibling temporary file first and renamed
    /// over `path`, so readers never observe a half-written file.
    #[instrument(skip(self))]
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&self.requests)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(path, e));
        }

        info!(path = %path.display(), count = self.len(), "request store saved");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// All requests in creation order.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// The id the next created request will receive: one past the highest
    /// id in use, starting at 1.
    ///
    /// Fails with [`StoreError::IdExhausted`] once `u64::MAX` is taken.
    pub fn next_id(&self) -> StoreResult<u64> {
        self.next_free_id().ok_or(StoreError::IdExhausted)
    }

    fn next_free_id(&self) -> Option<u64> {
        match self.requests.iter().map(Request::id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }

    pub fn get(&self, id: u64) -> Option<&Request> {
        self.requests.iter().find(|r| r.id() == id)
    }

    /// Classify `new` and store it as a `NEW` request.
    pub fn create(
        &mut self,
        new: NewRequest,
        classifier: &Classifier,
        clock: &impl Clock,
    ) -> StoreResult<&Request> {
        let id = self.next_id()?;
        let classification = classifier.classify(&new.summary, &new.description);
        let request = Request::create(id, new, &classification, clock.now());

        info!(
            request_id = id,
            priority = %request.priority(),
            department = %request.department(),
            category = %request.category(),
            "request created"
        );

        let index = self.requests.len();
        self.requests.push(request);
        Ok(&self.requests[index])
    }

    /// Classify and add sample requests.
    ///
    /// Seeds keep their given id and status.  The batch is validated as a
    /// whole: if any seed is invalid or its id is taken, nothing is added.
    /// Returns the number of requests added.
    pub fn import(
        &mut self,
        seeds: Vec<SeedRequest>,
        classifier: &Classifier,
        clock: &impl Clock,
    ) -> StoreResult<usize> {
        let mut staged: Vec<Request> = Vec::with_capacity(seeds.len());
        // `None` once `u64::MAX` is taken; only seeds without an id need one.
        let mut next_free = self.next_free_id();

        for seed in seeds {
            let id = match seed.id {
                Some(id) => id,
                None => next_free.ok_or(StoreError::IdExhausted)?,
            };
            if self.get(id).is_some() || staged.iter().any(|r| r.id() == id) {
                return Err(StoreError::DuplicateId(id));
            }
            next_free = match (next_free, id.checked_add(1)) {
                (Some(free), Some(after)) => Some(free.max(after)),
                _ => None,
            };

            let status = seed.lifecycle_state()?;
            let classification = classifier.classify(&seed.summary, &seed.description);
            let now = clock.now();
            let request = Request::from_parts(RequestParts {
                id,
                channel: seed.channel()?,
                requester_type: seed.requester_type()?,
                summary: seed.summary,
                description: seed.description,
                priority: classification.priority,
                department: classification.department,
                category: classification.category,
                status,
                created_at: now,
                updated_at: now,
            })?;
            staged.push(request);
        }

        let added = staged.len();
        self.requests.extend(staged);
        info!(count = added, "sample requests imported");
        Ok(added)
    }

    /// Advance request `id` one lifecycle step.
    pub fn advance<C: Clock>(
        &mut self,
        id: u64,
        tracker: &WorkflowTracker<C>,
    ) -> StoreResult<(AdvanceOutcome, &Request)> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(StoreError::NotFound {
                entity: "request",
                id,
            })?;
        let outcome = tracker.advance(request);
        Ok((outcome, &*request))
    }

    /// Requests matching `filter`, in creation order.
    pub fn filter(&self, filter: &RequestFilter) -> Vec<&Request> {
        self.requests.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Request count per lifecycle state, every state listed in order.
    pub fn status_counts(&self) -> Vec<(LifecycleState, usize)> {
        LifecycleState::ALL
            .into_iter()
            .map(|s| (s, self.requests.iter().filter(|r| r.status() == s).count()))
            .collect()
    }

    /// Request count per priority, `High` first, zero buckets included.
    pub fn priority_counts(&self) -> Vec<(Priority, usize)> {
        Priority::ALL
            .into_iter()
            .map(|p| (p, self.requests.iter().filter(|r| r.priority() == p).count()))
            .collect()
    }

    /// Request count per department that has at least one request, sorted
    /// by department name.
    pub fn department_counts(&self) -> Vec<(Department, usize)> {
        let mut counts: Vec<(Department, usize)> = Department::ALL
            .into_iter()
            .map(|d| (d, self.requests.iter().filter(|r| r.department() == d).count()))
            .filter(|&(_, n)| n > 0)
            .collect();
        counts.sort_by_key(|(d, _)| d.as_str());
        counts
    }
}

/// Read a JSON array of [`SeedRequest`]s.
pub fn load_seeds(path: &Path) -> StoreResult<Vec<SeedRequest>> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let seeds = serde_json::from_str(&content)?;
    Ok(seeds)
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
