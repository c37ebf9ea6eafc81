//! In-memory resource store for declared issues.

use crate::issue::{
    domain::{GithubIssue, GithubIssueSpec, ResourceKey},
    ports::{ResourceStore, ResourceStoreError, ResourceStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory store with optimistic concurrency.
///
/// Mirrors the semantics the reconciler relies on: versioned writes, a
/// separate status write path, and removal of a deleted resource once its
/// last finalizer is cleared.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    resources: HashMap<ResourceKey, GithubIssue>,
    object_writes: usize,
    status_writes: usize,
}

fn lock_error(err: impl std::fmt::Display) -> ResourceStoreError {
    ResourceStoreError::persistence(std::io::Error::other(err.to_string()))
}

fn check_version(stored: &GithubIssue, incoming: &GithubIssue) -> ResourceStoreResult<()> {
    if stored.metadata.resource_version != incoming.metadata.resource_version {
        return Err(ResourceStoreError::Conflict {
            key: incoming.key().clone(),
            expected: incoming.metadata.resource_version,
            actual: stored.metadata.resource_version,
        });
    }
    Ok(())
}

impl InMemoryResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new resource at version 1, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn insert(&self, resource: GithubIssue) -> ResourceStoreResult<GithubIssue> {
        let mut state = self.state.write().map_err(lock_error)?;
        let mut stored = resource;
        stored.metadata.resource_version = 1;
        state.resources.insert(stored.key().clone(), stored.clone());
        Ok(stored)
    }

    /// Replaces the spec of an existing resource, as a user edit would.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceStoreError::NotFound`] for an unknown key or a
    /// persistence error when lock acquisition fails.
    pub fn replace_spec(
        &self,
        key: &ResourceKey,
        spec: GithubIssueSpec,
    ) -> ResourceStoreResult<GithubIssue> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .resources
            .get_mut(key)
            .ok_or_else(|| ResourceStoreError::NotFound(key.clone()))?;
        stored.spec = spec;
        stored.metadata.resource_version += 1;
        Ok(stored.clone())
    }

    /// Requests removal of a resource.
    ///
    /// A resource without finalizers is removed immediately and `None` is
    /// returned. Otherwise the deletion timestamp is set (once) and the
    /// updated resource returned.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceStoreError::NotFound`] for an unknown key or a
    /// persistence error when lock acquisition fails.
    pub fn request_deletion(
        &self,
        key: &ResourceKey,
        requested_at: DateTime<Utc>,
    ) -> ResourceStoreResult<Option<GithubIssue>> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .resources
            .get_mut(key)
            .ok_or_else(|| ResourceStoreError::NotFound(key.clone()))?;

        if stored.metadata.finalizers.is_empty() {
            state.resources.remove(key);
            return Ok(None);
        }

        if stored.metadata.deletion_timestamp.is_none() {
            stored.metadata.deletion_timestamp = Some(requested_at);
            stored.metadata.resource_version += 1;
        }
        Ok(Some(stored.clone()))
    }

    /// Returns how many object (metadata and spec) writes succeeded.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn object_write_count(&self) -> ResourceStoreResult<usize> {
        Ok(self.state.read().map_err(lock_error)?.object_writes)
    }

    /// Returns how many status writes succeeded.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn status_write_count(&self) -> ResourceStoreResult<usize> {
        Ok(self.state.read().map_err(lock_error)?.status_writes)
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get(&self, key: &ResourceKey) -> ResourceStoreResult<Option<GithubIssue>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.resources.get(key).cloned())
    }

    async fn update(&self, resource: &GithubIssue) -> ResourceStoreResult<GithubIssue> {
        let mut state = self.state.write().map_err(lock_error)?;
        let key = resource.key().clone();
        let stored = state
            .resources
            .get_mut(&key)
            .ok_or_else(|| ResourceStoreError::NotFound(key.clone()))?;
        check_version(stored, resource)?;

        stored.spec = resource.spec.clone();
        stored.metadata.finalizers = resource.metadata.finalizers.clone();
        if resource.metadata.deletion_timestamp.is_some() {
            stored.metadata.deletion_timestamp = resource.metadata.deletion_timestamp;
        }
        stored.metadata.resource_version += 1;
        let updated = stored.clone();
        state.object_writes += 1;

        if updated.is_being_deleted() && updated.metadata.finalizers.is_empty() {
            state.resources.remove(&key);
        }
        Ok(updated)
    }

    async fn update_status(&self, resource: &GithubIssue) -> ResourceStoreResult<GithubIssue> {
        let mut state = self.state.write().map_err(lock_error)?;
        let key = resource.key().clone();
        let stored = state
            .resources
            .get_mut(&key)
            .ok_or(ResourceStoreError::NotFound(key))?;
        check_version(stored, resource)?;

        stored.status = resource.status.clone();
        stored.metadata.resource_version += 1;
        let updated = stored.clone();
        state.status_writes += 1;
        Ok(updated)
    }
}
