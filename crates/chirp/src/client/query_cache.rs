use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::reconcile::{reconcile, MutationResult};
use crate::models::{profiles::ProfileResponse, tweets::TweetPage};

/// Query shape plus parameters. Page size and cursors are not part of the
/// key: an infinite query owns all of its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Feed { only_following: bool },
    ProfileFeed { user_id: Uuid },
    Profile { user_id: Uuid },
}

impl QueryKey {
    pub fn global_feed() -> Self {
        QueryKey::Feed {
            only_following: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedQuery {
    /// Pages of an infinite query, in fetch order.
    Pages(Vec<TweetPage>),
    Profile(ProfileResponse),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    entries: HashMap<QueryKey, CachedQuery>,
}

impl CacheSnapshot {
    pub fn get(&self, key: &QueryKey) -> Option<&CachedQuery> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: QueryKey, value: CachedQuery) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &QueryKey) -> Option<CachedQuery> {
        self.entries.remove(key)
    }

    pub fn pages(&self, key: &QueryKey) -> Option<&[TweetPage]> {
        match self.entries.get(key) {
            Some(CachedQuery::Pages(pages)) => Some(pages),
            _ => None,
        }
    }

    pub fn profile(&self, key: &QueryKey) -> Option<&ProfileResponse> {
        match self.entries.get(key) {
            Some(CachedQuery::Profile(profile)) => Some(profile),
            _ => None,
        }
    }

    pub(super) fn entries_mut(&mut self) -> impl Iterator<Item = (&QueryKey, &mut CachedQuery)> {
        self.entries.iter_mut()
    }

    pub(super) fn get_mut(&mut self, key: &QueryKey) -> Option<&mut CachedQuery> {
        self.entries.get_mut(key)
    }
}

/// Shared, injectable client cache. Readers get clones; writers replace
/// entries or apply confirmed mutations through `reconcile`.
#[derive(Debug, Default)]
pub struct QueryCache {
    snapshot: RwLock<CacheSnapshot>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        QueryCache {
            snapshot: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn pages(&self, key: &QueryKey) -> Option<Vec<TweetPage>> {
        self.snapshot.read().await.pages(key).map(<[TweetPage]>::to_vec)
    }

    pub async fn profile(&self, key: &QueryKey) -> Option<ProfileResponse> {
        self.snapshot.read().await.profile(key).cloned()
    }

    pub async fn set_profile(&self, user_id: Uuid, profile: ProfileResponse) {
        self.snapshot
            .write()
            .await
            .insert(QueryKey::Profile { user_id }, CachedQuery::Profile(profile));
    }

    /// Appends a freshly fetched page to an infinite query, creating it if
    /// needed.
    pub async fn append_page(&self, key: QueryKey, page: TweetPage) {
        let mut snapshot = self.snapshot.write().await;
        match snapshot.get_mut(&key) {
            Some(CachedQuery::Pages(pages)) => pages.push(page),
            _ => snapshot.insert(key, CachedQuery::Pages(vec![page])),
        }
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.snapshot.write().await.remove(key);
    }

    /// Patches every cached query affected by a server-confirmed mutation.
    pub async fn apply(&self, mutation: &MutationResult) {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = reconcile(&snapshot, mutation);
    }
}
