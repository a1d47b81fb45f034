//! In-memory mirror of one backend collection.
//!
//! A fetch either replaces the whole list or, on failure, empties it. Mutations go
//! through [`EventStore::reconcile`]: the local copy is patched right away and then
//! refetched; a failed refetch keeps the patched copy.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::error::Result;

pub trait Record: Clone + Send + Sync + 'static {
    fn record_id(&self) -> &str;
}

#[derive(Debug, Clone)]
pub enum Mutation<T> {
    Upsert(T),
    Remove(String),
}

#[derive(Debug)]
struct StoreState<T> {
    items: Vec<T>,
    loaded: bool,
}

#[derive(Debug, Clone)]
pub struct EventStore<T> {
    name: &'static str,
    state: Arc<RwLock<StoreState<T>>>,
}

impl<T: Record> EventStore<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(RwLock::new(StoreState {
                items: Vec::new(),
                loaded: false,
            })),
        }
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.state.read().await.items.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub async fn replace_all(&self, items: Vec<T>) {
        let mut state = self.state.write().await;
        state.items = items;
        state.loaded = true;
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.items.clear();
        state.loaded = true;
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.record_id() == id)
            .cloned()
    }

    pub async fn apply(&self, mutation: Mutation<T>) {
        let mut state = self.state.write().await;
        match mutation {
            Mutation::Upsert(item) => {
                let position = state
                    .items
                    .iter()
                    .position(|existing| existing.record_id() == item.record_id());
                match position {
                    Some(idx) => state.items[idx] = item,
                    None => state.items.push(item),
                }
            }
            Mutation::Remove(id) => state.items.retain(|item| item.record_id() != id),
        }
    }

    /// Full refetch. Success replaces the list; failure leaves it empty and hands the
    /// error back to the caller.
    pub async fn refresh<F, Fut>(&self, fetch: F) -> Result<Vec<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        match fetch().await {
            Ok(items) => {
                self.replace_all(items.clone()).await;
                Ok(items)
            }
            Err(err) => {
                warn!(store = self.name, error = %err, "Fetch failed, clearing cached list");
                self.clear().await;
                Err(err)
            }
        }
    }

    /// Loads the list on first use only.
    pub async fn ensure_loaded<F, Fut>(&self, fetch: F) -> Result<Vec<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        if self.is_loaded().await {
            return Ok(self.snapshot().await);
        }
        self.refresh(fetch).await
    }

    /// Applies `mutation` locally, then refetches. The mutation already succeeded on
    /// the backend, so a failed refetch keeps the patched list.
    pub async fn reconcile<F, Fut>(&self, mutation: Mutation<T>, refetch: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        self.apply(mutation).await;
        match refetch().await {
            Ok(items) => self.replace_all(items).await,
            Err(err) => {
                warn!(store = self.name, error = %err, "Reconciling refetch failed, keeping local patch");
            }
        }
    }
}
