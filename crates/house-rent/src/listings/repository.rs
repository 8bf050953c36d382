use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use tokio::sync::watch;

use super::domain::{Listing, ListingId, ListingPatch, ListingStatus, NewListing};
use crate::session::UserId;
use crate::store::StoreError;

/// Storage abstraction over the `listings` collection.
///
/// Every mutation is a single independent write: it either lands completely
/// or reports the provider's failure without retrying.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn create(&self, listing: NewListing) -> Result<ListingId, StoreError>;

    async fn fetch(&self, id: &ListingId) -> Result<Listing, StoreError>;

    /// One-shot read of every listing in `status`, newest first.
    async fn query_by_status(&self, status: ListingStatus) -> Result<Vec<Listing>, StoreError>;

    /// Live view of the whole collection, newest first.
    async fn subscribe_all(&self) -> Result<ListingSubscription, StoreError>;

    /// Live view of one owner's listings, newest first.
    async fn subscribe_by_owner(&self, owner: &UserId) -> Result<ListingSubscription, StoreError>;

    async fn update(&self, id: &ListingId, patch: ListingPatch) -> Result<(), StoreError>;

    async fn delete(&self, id: &ListingId) -> Result<(), StoreError>;
}

pub type SnapshotReceiver = watch::Receiver<Arc<Vec<Listing>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionScope {
    All,
    Owner(UserId),
}

impl SubscriptionScope {
    fn select(&self, snapshot: &[Listing]) -> Vec<Listing> {
        match self {
            SubscriptionScope::All => snapshot.to_vec(),
            SubscriptionScope::Owner(owner) => snapshot
                .iter()
                .filter(|listing| listing.owner_id == *owner)
                .cloned()
                .collect(),
        }
    }
}

/// Counts live subscriptions; each handle holds one slot until dropped.
#[derive(Debug, Default, Clone)]
pub struct ListenerCount(Arc<AtomicUsize>);

impl ListenerCount {
    pub fn active(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    fn acquire(&self) -> ListenerSlot {
        self.0.fetch_add(1, Ordering::AcqRel);
        ListenerSlot(self.0.clone())
    }
}

#[derive(Debug)]
struct ListenerSlot(Arc<AtomicUsize>);

impl Drop for ListenerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Cancellable handle yielding full snapshots. Dropping it releases the listener.
#[derive(Debug)]
pub struct ListingSubscription {
    receiver: SnapshotReceiver,
    scope: SubscriptionScope,
    delivered_initial: bool,
    _slot: ListenerSlot,
}

impl ListingSubscription {
    pub fn new(
        receiver: SnapshotReceiver,
        scope: SubscriptionScope,
        listeners: &ListenerCount,
    ) -> Self {
        Self {
            receiver,
            scope,
            delivered_initial: false,
            _slot: listeners.acquire(),
        }
    }

    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    /// Snapshot as of now, without waiting for a change.
    pub fn current(&self) -> Vec<Listing> {
        self.scope.select(&self.receiver.borrow())
    }

    /// Yields the current snapshot first, then one snapshot per change.
    /// Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Vec<Listing>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            let snapshot = self.scope.select(&self.receiver.borrow_and_update());
            return Some(snapshot);
        }

        self.receiver.changed().await.ok()?;
        let snapshot = self.scope.select(&self.receiver.borrow_and_update());
        Some(snapshot)
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<Listing>> + Send + 'static {
        stream::unfold(self, |mut subscription| async move {
            let snapshot = subscription.next().await?;
            Some((snapshot, subscription))
        })
    }
}
