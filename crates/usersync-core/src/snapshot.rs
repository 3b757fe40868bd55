//! Existing users of an account, keyed by email.

use crate::directory::{Directory, DirectoryResult};
use crate::types::DirectoryUser;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    users: HashMap<String, DirectoryUser>,
}

impl Snapshot {
    pub fn from_users(users: Vec<DirectoryUser>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.email.clone(), u)).collect(),
        }
    }

    pub fn get(&self, email: &str) -> Option<&DirectoryUser> {
        self.users.get(email)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Fetch a fresh snapshot. A failed listing is an error, never an empty
/// snapshot.
pub fn fetch(directory: &dyn Directory, account_id: &str) -> DirectoryResult<Snapshot> {
    let users = directory.list_users(account_id)?;
    tracing::debug!(account_id, users = users.len(), "fetched account users");
    Ok(Snapshot::from_users(users))
}

/// Per-run cache of snapshots by account id.
///
/// An account's entry must be invalidated whenever a mutation is issued
/// against that account. Failed fetches are never cached.
#[derive(Debug)]
pub struct SnapshotCache {
    enabled: bool,
    entries: HashMap<String, Snapshot>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SnapshotCache {
    /// With `enabled = false` every lookup refetches.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_fetch(
        &mut self,
        directory: &dyn Directory,
        account_id: &str,
    ) -> DirectoryResult<&Snapshot> {
        if !self.enabled || !self.entries.contains_key(account_id) {
            let snapshot = fetch(directory, account_id)?;
            self.entries.insert(account_id.to_string(), snapshot);
        }
        Ok(&self.entries[account_id])
    }

    pub fn invalidate(&mut self, account_id: &str) {
        self.entries.remove(account_id);
    }
}
