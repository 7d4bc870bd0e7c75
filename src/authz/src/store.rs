//! In-memory credential and group stores
//!
//! Used by the CLI (backed by a JSON file) and by tests. Production
//! deployments implement [`CredentialStore`] and [`GroupStore`] over their
//! own database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use scopegate_core::{
    CoreError, CredentialStore, GrantSet, GroupRecord, GroupStore, KeyRecord, Result,
};
use std::collections::BTreeSet;
use std::path::Path;
use uuid::Uuid;

/// Key records indexed by id and by digest
#[derive(Default)]
pub struct InMemoryCredentialStore {
    keys: DashMap<Uuid, KeyRecord>,
    by_digest: DashMap<String, Uuid>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub fn insert(&self, record: KeyRecord) {
        if let Some(previous) = self.keys.get(&record.id) {
            self.by_digest.remove(&previous.digest);
        }
        self.by_digest.insert(record.digest.clone(), record.id);
        self.keys.insert(record.id, record);
    }

    pub fn get(&self, id: &Uuid) -> Option<KeyRecord> {
        self.keys.get(id).map(|entry| entry.value().clone())
    }

    pub fn find_by_prefix(&self, prefix: &str) -> Option<KeyRecord> {
        self.keys
            .iter()
            .find(|entry| entry.prefix == prefix)
            .map(|entry| entry.value().clone())
    }

    /// All records, oldest first
    pub fn records(&self) -> Vec<KeyRecord> {
        let mut records: Vec<KeyRecord> = self.keys.iter().map(|e| e.value().clone()).collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        records
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Load records from a JSON array; a missing file is an empty store
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new();
        let contents = match tokio::fs::read_to_string(path.as_ref()).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(store),
            Err(e) => return Err(e.into()),
        };

        let records: Vec<KeyRecord> = serde_json::from_str(&contents)?;
        for record in records {
            store.insert(record);
        }
        Ok(store)
    }

    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records())?;
        tokio::fs::write(path.as_ref(), json).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_digest(&self, digest: &str) -> Result<Option<KeyRecord>> {
        let Some(id) = self.by_digest.get(digest).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self.get(&id))
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut record = self
            .keys
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found(format!("key {}", id)))?;
        record.last_used_at = Some(at);
        Ok(())
    }
}

/// Groups and memberships
#[derive(Default)]
pub struct InMemoryGroupStore {
    groups: DashMap<String, GroupRecord>,
    members: DashMap<String, BTreeSet<String>>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&self, group: GroupRecord) {
        self.groups.insert(group.name.clone(), group);
    }

    /// Add a user to a group; the group need not exist yet
    pub fn add_member(&self, user_id: impl Into<String>, group: impl Into<String>) {
        self.members.entry(user_id.into()).or_default().insert(group.into());
    }

    pub fn group(&self, name: &str) -> Option<GroupRecord> {
        self.groups.get(name).map(|e| e.value().clone())
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn scopes_for_user(&self, user_id: &str) -> Result<GrantSet> {
        let mut grants = GrantSet::new();
        if let Some(names) = self.members.get(user_id) {
            // Memberships without a scoped group contribute nothing
            for group in names.iter().filter_map(|name| self.groups.get(name)) {
                grants.union_with(&group.scopes);
            }
        }
        Ok(grants)
    }
}
