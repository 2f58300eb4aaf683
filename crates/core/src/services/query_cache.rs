use chrono::{DateTime, Utc};

use crate::models::instance::Instance;
use crate::models::operation::Operation;

/// Read queries the dashboard caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Operations,
    Instances,
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKey::Operations => write!(f, "operations"),
            QueryKey::Instances => write!(f, "instances"),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    data: Vec<T>,
    fetched_at: DateTime<Utc>,
}

/// Client-side cache of read-query results.
///
/// Entries live until invalidated; there is no expiry. A successful
/// mutation invalidates the queries it affects so the next read refetches.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    operations: Option<Entry<Operation>>,
    instances: Option<Entry<Instance>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> Option<&[Operation]> {
        self.operations.as_ref().map(|e| e.data.as_slice())
    }

    pub fn instances(&self) -> Option<&[Instance]> {
        self.instances.as_ref().map(|e| e.data.as_slice())
    }

    pub fn set_operations(&mut self, data: Vec<Operation>) {
        self.operations = Some(Entry { data, fetched_at: Utc::now() });
    }

    pub fn set_instances(&mut self, data: Vec<Instance>) {
        self.instances = Some(Entry { data, fetched_at: Utc::now() });
    }

    /// When the query was last filled, if it is cached.
    pub fn fetched_at(&self, key: QueryKey) -> Option<DateTime<Utc>> {
        match key {
            QueryKey::Operations => self.operations.as_ref().map(|e| e.fetched_at),
            QueryKey::Instances => self.instances.as_ref().map(|e| e.fetched_at),
        }
    }

    pub fn contains(&self, key: QueryKey) -> bool {
        self.fetched_at(key).is_some()
    }

    pub fn invalidate(&mut self, key: QueryKey) {
        match key {
            QueryKey::Operations => self.operations = None,
            QueryKey::Instances => self.instances = None,
        }
    }

    pub fn clear(&mut self) {
        self.operations = None;
        self.instances = None;
    }
}
