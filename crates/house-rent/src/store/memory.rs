use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use super::StoreError;
use crate::listings::document;
use crate::listings::domain::{Listing, ListingId, ListingPatch, ListingStatus, NewListing};
use crate::listings::repository::{
    ListenerCount, ListingRepository, ListingSubscription, SubscriptionScope,
};
use crate::session::directory::UserDirectory;
use crate::session::domain::{ProfileRecord, UserId};

/// Process-local `listings` collection holding raw documents.
///
/// Every write re-decodes the collection and broadcasts the result to live
/// subscribers, newest first.
pub struct InMemoryListingStore {
    documents: Mutex<BTreeMap<String, Value>>,
    snapshot: watch::Sender<Arc<Vec<Listing>>>,
    listeners: ListenerCount,
    sequence: AtomicU64,
}

impl Default for InMemoryListingStore {
    fn default() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            documents: Mutex::new(BTreeMap::new()),
            snapshot,
            listeners: ListenerCount::default(),
            sequence: AtomicU64::new(1),
        }
    }
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw document under a caller-chosen id, bypassing validation.
    pub fn insert_document(&self, id: impl Into<String>, fields: Value) -> Result<(), StoreError> {
        let mut documents = self.lock()?;
        documents.insert(id.into(), fields);
        self.publish(&documents);
        Ok(())
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.active()
    }

    fn next_id(&self) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("listing-{id:06}")
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Value>>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable("listing store lock poisoned".to_string()))
    }

    fn publish(&self, documents: &BTreeMap<String, Value>) {
        let mut listings = document::decode_snapshot(documents.iter());
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = listings.len(), "publishing listing snapshot");
        self.snapshot.send_replace(Arc::new(listings));
    }

    fn subscription(&self, scope: SubscriptionScope) -> ListingSubscription {
        ListingSubscription::new(self.snapshot.subscribe(), scope, &self.listeners)
    }
}

fn invalid(err: document::DocumentError, id: &str) -> StoreError {
    StoreError::InvalidDocument {
        id: id.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingStore {
    async fn create(&self, listing: NewListing) -> Result<ListingId, StoreError> {
        let id = self.next_id();
        let fields = document::encode_new(&listing).map_err(|err| StoreError::InvalidDocument {
            id: id.clone(),
            reason: err.to_string(),
        })?;
        document::decode(&id, &fields).map_err(|err| invalid(err, &id))?;

        let mut documents = self.lock()?;
        documents.insert(id.clone(), fields);
        self.publish(&documents);
        Ok(ListingId(id))
    }

    async fn fetch(&self, id: &ListingId) -> Result<Listing, StoreError> {
        let documents = self.lock()?;
        let fields = documents
            .get(id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        document::decode(id.as_str(), fields).map_err(|err| invalid(err, id.as_str()))
    }

    async fn query_by_status(&self, status: ListingStatus) -> Result<Vec<Listing>, StoreError> {
        let snapshot = self.snapshot.borrow().clone();
        Ok(snapshot
            .iter()
            .filter(|listing| listing.status == status)
            .cloned()
            .collect())
    }

    async fn subscribe_all(&self) -> Result<ListingSubscription, StoreError> {
        Ok(self.subscription(SubscriptionScope::All))
    }

    async fn subscribe_by_owner(&self, owner: &UserId) -> Result<ListingSubscription, StoreError> {
        Ok(self.subscription(SubscriptionScope::Owner(owner.clone())))
    }

    async fn update(&self, id: &ListingId, patch: ListingPatch) -> Result<(), StoreError> {
        let mut documents = self.lock()?;
        let current = documents
            .get(id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        // Patch a copy so a rejected write leaves the stored document untouched.
        let mut updated = current.clone();
        document::apply_patch(id, &mut updated, patch).map_err(|err| invalid(err, id.as_str()))?;
        document::decode(id.as_str(), &updated).map_err(|err| invalid(err, id.as_str()))?;

        documents.insert(id.to_string(), updated);
        self.publish(&documents);
        Ok(())
    }

    async fn delete(&self, id: &ListingId) -> Result<(), StoreError> {
        let mut documents = self.lock()?;
        if documents.remove(id.as_str()).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.publish(&documents);
        Ok(())
    }
}

/// Process-local `users` collection.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    profiles: Mutex<BTreeMap<UserId, Value>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<UserId, Value>>, StoreError> {
        self.profiles
            .lock()
            .map_err(|_| StoreError::Unavailable("user directory lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn fetch_profile(&self, uid: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
        let profiles = self.lock()?;
        profiles
            .get(uid)
            .map(|fields| {
                serde_json::from_value(fields.clone()).map_err(|err| StoreError::InvalidDocument {
                    id: uid.to_string(),
                    reason: err.to_string(),
                })
            })
            .transpose()
    }

    async fn create_profile(&self, uid: &UserId, record: ProfileRecord) -> Result<(), StoreError> {
        let fields = serde_json::to_value(&record).map_err(|err| StoreError::InvalidDocument {
            id: uid.to_string(),
            reason: err.to_string(),
        })?;
        self.lock()?.insert(uid.clone(), fields);
        Ok(())
    }

    async fn count_users(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::lifecycle;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use std::collections::BTreeSet;

    fn new_listing(owner: &str, title: &str, days_ago: i64) -> NewListing {
        let created_at =
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap() - Duration::days(days_ago);
        NewListing {
            title: title.to_string(),
            city: "adama".to_string(),
            area: "Posta Bet".to_string(),
            price: 7_000,
            rooms: 1,
            max_people: 2,
            environment: BTreeSet::new(),
            description: "Near the bus station".to_string(),
            images: vec!["https://img.example/a.jpg".to_string()],
            owner_phone: "+251922000000".to_string(),
            owner_id: UserId(owner.to_string()),
            owner_name: Some(owner.to_string()),
            status: ListingStatus::Pending,
            hidden: false,
            availability_duration: 30,
            expiry_date: lifecycle::expiry_for(created_at, 30),
            created_at,
        }
    }

    #[tokio::test]
    async fn subscription_yields_newest_first_and_follows_changes() {
        let store = InMemoryListingStore::new();
        store.create(new_listing("a", "older", 3)).await.expect("create");

        let mut subscription = store.subscribe_all().await.expect("subscribe");
        let first = subscription.next().await.expect("initial snapshot");
        assert_eq!(first.len(), 1);

        store.create(new_listing("b", "newer", 1)).await.expect("create");
        let second = subscription.next().await.expect("change snapshot");
        let titles: Vec<_> = second.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn owner_subscription_only_sees_owned_listings() {
        let store = InMemoryListingStore::new();
        store.create(new_listing("a", "mine", 1)).await.expect("create");
        store.create(new_listing("b", "theirs", 1)).await.expect("create");

        let subscription = store
            .subscribe_by_owner(&UserId("a".to_string()))
            .await
            .expect("subscribe");
        let current = subscription.current();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].title, "mine");
    }

    #[tokio::test]
    async fn dropping_a_subscription_releases_its_listener() {
        let store = InMemoryListingStore::new();
        let first = store.subscribe_all().await.expect("subscribe");
        let second = store
            .subscribe_by_owner(&UserId("a".to_string()))
            .await
            .expect("subscribe");
        assert_eq!(store.active_listeners(), 2);
        drop(first);
        assert_eq!(store.active_listeners(), 1);
        drop(second);
        assert_eq!(store.active_listeners(), 0);
    }

    #[tokio::test]
    async fn expiry_written_at_creation_is_stable_on_reread() {
        let store = InMemoryListingStore::new();
        let listing = new_listing("a", "stable", 0);
        let expected = listing.expiry_date;
        let id = store.create(listing).await.expect("create");

        let first = store.fetch(&id).await.expect("fetch");
        let second = store.fetch(&id).await.expect("fetch");
        assert_eq!(first.expiry_date, Some(expected));
        assert_eq!(second.expiry_date, first.expiry_date);
        assert_eq!(first.availability_duration, Some(30));
    }

    #[tokio::test]
    async fn update_and_delete_missing_documents_report_not_found() {
        let store = InMemoryListingStore::new();
        let missing = ListingId("nope".to_string());
        assert_eq!(
            store.update(&missing, lifecycle::set_hidden(true)).await,
            Err(StoreError::NotFound("nope".to_string()))
        );
        assert_eq!(
            store.delete(&missing).await,
            Err(StoreError::NotFound("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn malformed_documents_are_quarantined_from_snapshots() {
        let store = InMemoryListingStore::new();
        store.create(new_listing("a", "good", 1)).await.expect("create");
        store
            .insert_document("broken", json!({ "title": "missing everything" }))
            .expect("raw insert");

        let subscription = store.subscribe_all().await.expect("subscribe");
        assert_eq!(subscription.current().len(), 1);
        assert!(matches!(
            store.fetch(&ListingId("broken".to_string())).await,
            Err(StoreError::InvalidDocument { .. })
        ));
    }

    #[tokio::test]
    async fn query_by_status_is_a_one_shot_filter() {
        let store = InMemoryListingStore::new();
        let id = store.create(new_listing("a", "approved", 2)).await.expect("create");
        store.create(new_listing("a", "pending", 1)).await.expect("create");
        let listing = store.fetch(&id).await.expect("fetch");
        store
            .update(&id, lifecycle::approve(&listing, Utc::now()))
            .await
            .expect("approve");

        let approved = store
            .query_by_status(ListingStatus::Approved)
            .await
            .expect("query");
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].title, "approved");
        assert_eq!(approved[0].status_history.len(), 1);
    }

    #[tokio::test]
    async fn user_directory_counts_and_reads_back_profiles() {
        let directory = InMemoryUserDirectory::new();
        let uid = UserId("u1".to_string());
        assert_eq!(directory.fetch_profile(&uid).await, Ok(None));

        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let record = ProfileRecord::new(
            "u1@example.et",
            "Tigist",
            crate::session::Role::Admin,
            created_at,
        );
        directory
            .create_profile(&uid, record.clone())
            .await
            .expect("create profile");

        assert_eq!(directory.fetch_profile(&uid).await, Ok(Some(record)));
        assert_eq!(directory.count_users().await, Ok(1));
    }
}
