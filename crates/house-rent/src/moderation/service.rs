use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::integrations::assistant::{
    review_prompt, AssistKind, AssistRequest, AssistantError, TextAssistant,
};
use crate::listings::lifecycle::{self, LifecycleError};
use crate::listings::{Listing, ListingId, ListingRepository, ListingSubscription};
use crate::session::UserDirectory;
use crate::store::StoreError;

use super::dashboard::DashboardStats;

/// Admin-only listing moderation.
pub struct ModerationService {
    repository: Arc<dyn ListingRepository>,
    directory: Arc<dyn UserDirectory>,
    assistant: Arc<dyn TextAssistant>,
}

impl ModerationService {
    pub fn new(
        repository: Arc<dyn ListingRepository>,
        directory: Arc<dyn UserDirectory>,
        assistant: Arc<dyn TextAssistant>,
    ) -> Self {
        Self {
            repository,
            directory,
            assistant,
        }
    }

    /// Live view of every listing, newest first.
    pub async fn subscribe(&self) -> Result<ListingSubscription, ModerationError> {
        Ok(self.repository.subscribe_all().await?)
    }

    pub async fn approve(
        &self,
        id: &ListingId,
        at: DateTime<Utc>,
    ) -> Result<Listing, ModerationError> {
        let listing = self.repository.fetch(id).await?;
        let patch = lifecycle::approve(&listing, at);
        self.repository.update(id, patch).await?;
        info!(listing = %id, from = listing.status.as_str(), "listing approved");
        Ok(self.repository.fetch(id).await?)
    }

    /// Rejects with a reason. A blank reason fails before the store is read.
    pub async fn reject(
        &self,
        id: &ListingId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<Listing, ModerationError> {
        lifecycle::validate_rejection_reason(reason)?;
        let listing = self.repository.fetch(id).await?;
        let patch = lifecycle::reject(&listing, reason, at)?;
        self.repository.update(id, patch).await?;
        info!(listing = %id, from = listing.status.as_str(), "listing rejected");
        Ok(self.repository.fetch(id).await?)
    }

    /// Sets the hidden flag, or flips it when `hidden` is `None`.
    pub async fn set_visibility(
        &self,
        id: &ListingId,
        hidden: Option<bool>,
    ) -> Result<Listing, ModerationError> {
        let patch = match hidden {
            Some(hidden) => lifecycle::set_hidden(hidden),
            None => lifecycle::toggle_hidden(&self.repository.fetch(id).await?),
        };
        self.repository.update(id, patch).await?;
        let listing = self.repository.fetch(id).await?;
        info!(listing = %id, hidden = listing.hidden, "listing visibility changed");
        Ok(listing)
    }

    /// Permanent removal.
    pub async fn delete(&self, id: &ListingId) -> Result<(), ModerationError> {
        self.repository.delete(id).await?;
        warn!(listing = %id, "listing deleted");
        Ok(())
    }

    pub async fn stats(&self, listings: &[Listing]) -> Result<DashboardStats, ModerationError> {
        let users = self.directory.count_users().await?;
        Ok(DashboardStats::compute(listings, users))
    }

    /// Asks the assistant for a moderation opinion on one listing.
    pub async fn review(&self, id: &ListingId) -> Result<String, ModerationError> {
        let listing = self.repository.fetch(id).await?;
        let request = AssistRequest::new(review_prompt(&listing), AssistKind::AdminReview);
        Ok(self.assistant.complete(&request).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
}
