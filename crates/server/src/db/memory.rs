//! In-memory store used by coordinator and router tests.
//!
//! Implements both store traits over hash maps behind a mutex. This is
//! the injectable fake that lets the dual-write pipelines be exercised
//! without a live database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use mailmirror_core::{ListId, MemberId};

use super::{ListStore, MemberStore, RepositoryError};
use crate::models::{List, Member};

/// In-process implementation of [`ListStore`] and [`MemberStore`].
#[derive(Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<ListId, List>>,
    members: Mutex<HashMap<MemberId, Member>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_lists(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ListId, List>>, RepositoryError> {
        self.lists
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("poisoned list lock".to_string()))
    }

    fn lock_members(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<MemberId, Member>>, RepositoryError> {
        self.members
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("poisoned member lock".to_string()))
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn insert(&self, list: &List) -> Result<(), RepositoryError> {
        let mut lists = self.lock_lists()?;
        if lists.contains_key(&list.id) {
            return Err(RepositoryError::Conflict("list id already exists".to_string()));
        }
        lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn update(&self, list: &List) -> Result<(), RepositoryError> {
        let mut lists = self.lock_lists()?;
        if !lists.contains_key(&list.id) {
            return Err(RepositoryError::NotFound);
        }
        lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn remove(&self, id: ListId) -> Result<(), RepositoryError> {
        let mut lists = self.lock_lists()?;
        if lists.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find(&self, id: ListId) -> Result<Option<List>, RepositoryError> {
        Ok(self.lock_lists()?.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<List>, RepositoryError> {
        let mut lists: Vec<List> = self.lock_lists()?.values().cloned().collect();
        lists.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(lists)
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn insert(&self, member: &Member) -> Result<(), RepositoryError> {
        let mut members = self.lock_members()?;
        if members.contains_key(&member.id) {
            return Err(RepositoryError::Conflict("member id already exists".to_string()));
        }
        members.insert(member.id, member.clone());
        Ok(())
    }

    async fn update(&self, member: &Member) -> Result<(), RepositoryError> {
        let mut members = self.lock_members()?;
        if !members.contains_key(&member.id) {
            return Err(RepositoryError::NotFound);
        }
        members.insert(member.id, member.clone());
        Ok(())
    }

    async fn remove(&self, id: MemberId) -> Result<(), RepositoryError> {
        let mut members = self.lock_members()?;
        if members.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_in_list(
        &self,
        list_id: ListId,
        id: MemberId,
    ) -> Result<Option<Member>, RepositoryError> {
        Ok(self
            .lock_members()?
            .get(&id)
            .filter(|member| member.list_id == list_id)
            .cloned())
    }

    async fn find_by_list(&self, list_id: ListId) -> Result<Vec<Member>, RepositoryError> {
        let mut members: Vec<Member> = self
            .lock_members()?
            .values()
            .filter(|member| member.list_id == list_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.email_address.as_str().cmp(b.email_address.as_str()));
        Ok(members)
    }

    async fn find_by_email(
        &self,
        list_id: ListId,
        email_address: &str,
    ) -> Result<Vec<Member>, RepositoryError> {
        Ok(self
            .lock_members()?
            .values()
            .filter(|member| {
                member.list_id == list_id && member.email_address.as_str() == email_address
            })
            .cloned()
            .collect())
    }
}
