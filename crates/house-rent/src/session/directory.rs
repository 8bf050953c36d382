use async_trait::async_trait;

use super::domain::{ProfileRecord, UserId};
use crate::store::StoreError;

/// Access to the `users` collection, keyed by the identity id.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch_profile(&self, uid: &UserId) -> Result<Option<ProfileRecord>, StoreError>;

    async fn create_profile(&self, uid: &UserId, record: ProfileRecord) -> Result<(), StoreError>;

    async fn count_users(&self) -> Result<usize, StoreError>;
}
