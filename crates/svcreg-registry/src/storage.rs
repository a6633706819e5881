//! In-memory storage for the service registry.
//!
//! # Rust Learning Note
//!
//! This module demonstrates **concurrent data structures** in Rust.
//!
//! ## Why DashMap?
//!
//! The HTTP server runs every connection on its own tokio task, possibly
//! on different worker threads, and all of them share one registry. A
//! plain `HashMap` cannot be mutated from several threads at once - the
//! compiler refuses to share it without synchronization. `DashMap` is a
//! sharded map with a lock per shard:
//!
//! - **Type-safe**: Can't forget to lock/unlock
//! - **Low contention**: Writers to different shards don't block each other
//! - **Simple API**: Just like HashMap but takes `&self`

use crate::types::ServiceRecord;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use svcreg_common::ServiceID;
use tracing::{debug, info};

/// Thread-safe in-memory registry storage.
///
/// Cloning is cheap and every clone sees the same records.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    services: Arc<DashMap<ServiceID, ServiceRecord>>,
}

impl Registry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an endpoint and returns the stored record.
    ///
    /// The id is derived from `(name, host, port)`, so registering the
    /// same triple again replaces the earlier record, timestamp included.
    /// No validation happens here; that is the HTTP layer's job.
    pub fn register(&self, name: &str, host: &str, port: u16) -> ServiceRecord {
        let record = ServiceRecord::new(name, host, port);

        match self.services.insert(record.id.clone(), record.clone()) {
            Some(_) => info!("Replaced service: {}", record.id),
            None => info!("Registered new service: {}", record.id),
        }

        record
    }

    /// Removes a record. Returns whether anything was removed.
    pub fn unregister(&self, id: &ServiceID) -> bool {
        let removed = self.services.remove(id).is_some();

        if removed {
            info!("Unregistered service: {}", id);
        } else {
            debug!("Unregister ignored, no service with id {}", id);
        }

        removed
    }

    /// Snapshot of every record, keyed by id.
    ///
    /// The snapshot is detached from the registry: mutating it has no
    /// effect on stored records.
    pub fn get_all(&self) -> BTreeMap<ServiceID, ServiceRecord> {
        self.services
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// All records whose name is exactly `name`, in no particular order.
    pub fn find_by_name(&self, name: &str) -> Vec<ServiceRecord> {
        self.services
            .iter()
            .filter(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Looks up a single record.
    pub fn get(&self, id: &ServiceID) -> Option<ServiceRecord> {
        self.services.get(id).map(|entry| entry.value().clone())
    }

    /// Returns the number of registered services.
    pub fn count(&self) -> usize {
        self.services.len()
    }

    /// Clears all entries from the registry.
    pub fn clear(&self) {
        self.services.clear();
        info!("Cleared all registry entries");
    }
}
