use dashmap::DashMap;
use httpdns_domain::{NetworkStack, UnresolvedReason};
use rustc_hash::FxBuildHasher;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::watch;

pub type InflightKey = (Arc<str>, NetworkStack);

pub type InflightResult = Result<Arc<[IpAddr]>, UnresolvedReason>;

type InflightSender = Arc<watch::Sender<Option<Arc<InflightResult>>>>;
type InflightMap = DashMap<InflightKey, InflightSender, FxBuildHasher>;

/// At most one resolution in flight per `(domain, stack)`; later callers wait
/// on the leader's result instead of issuing their own exchange.
pub struct InflightRegistry {
    inflight: Arc<InflightMap>,
}

pub enum Registration {
    Leader(InflightLeaderGuard),
    Follower(watch::Receiver<Option<Arc<InflightResult>>>),
}

/// Held by the caller that performs the exchange. Dropping it without
/// `complete` releases waiters with no result.
pub struct InflightLeaderGuard {
    inflight: Arc<InflightMap>,
    key: InflightKey,
}

impl InflightLeaderGuard {
    pub fn key(&self) -> &InflightKey {
        &self.key
    }

    pub fn complete(self, result: InflightResult) {
        if let Some((_, tx)) = self.inflight.remove(&self.key) {
            let _ = tx.send(Some(Arc::new(result)));
        }
    }
}

impl Drop for InflightLeaderGuard {
    fn drop(&mut self) {
        if let Some((_, tx)) = self.inflight.remove(&self.key) {
            let _ = tx.send(None);
        }
    }
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(DashMap::with_hasher(FxBuildHasher)),
        }
    }

    pub fn register_or_join(&self, key: InflightKey) -> Registration {
        match self.inflight.entry(key.clone()) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                Registration::Follower(rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, _rx) = watch::channel(None::<Arc<InflightResult>>);
                e.insert(Arc::new(tx));
                Registration::Leader(InflightLeaderGuard {
                    inflight: Arc::clone(&self.inflight),
                    key,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}

impl Default for InflightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for the leader. `None` means the leader was abandoned.
pub async fn wait_for_leader(
    mut rx: watch::Receiver<Option<Arc<InflightResult>>>,
) -> Option<Arc<InflightResult>> {
    if rx.changed().await.is_ok() {
        if let Some(result) = rx.borrow().clone() {
            return Some(result);
        }
    }
    rx.borrow().clone()
}
