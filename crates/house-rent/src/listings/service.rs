use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{Listing, ListingStatus};
use super::filter::ListingFilter;
use super::lifecycle;
use super::repository::{ListingRepository, ListingSubscription};
use super::submission::{ListingSubmission, SubmissionError};
use crate::integrations::assistant::{AssistKind, AssistRequest, AssistantError, TextAssistant};
use crate::session::{Identity, UserId};
use crate::store::StoreError;

/// Owner- and visitor-facing listing operations.
pub struct ListingService {
    repository: Arc<dyn ListingRepository>,
    assistant: Arc<dyn TextAssistant>,
}

impl ListingService {
    pub fn new(repository: Arc<dyn ListingRepository>, assistant: Arc<dyn TextAssistant>) -> Self {
        Self {
            repository,
            assistant,
        }
    }

    /// Validates an add-listing form and stores it as a pending listing.
    pub async fn submit(
        &self,
        owner: &Identity,
        submission: ListingSubmission,
        now: DateTime<Utc>,
    ) -> Result<Listing, ListingServiceError> {
        let listing = submission.into_new_listing(owner, now)?;
        let id = self.repository.create(listing).await?;
        info!(listing = %id, owner = %owner.uid, "listing submitted for review");
        Ok(self.repository.fetch(&id).await?)
    }

    /// Publicly visible listings matching `filter`, newest first.
    pub async fn browse(
        &self,
        filter: &ListingFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, ListingServiceError> {
        let approved = self
            .repository
            .query_by_status(ListingStatus::Approved)
            .await?;
        let visible: Vec<&Listing> = approved
            .iter()
            .filter(|listing| lifecycle::is_visible(listing, now))
            .collect();
        Ok(filter
            .apply(visible.into_iter())
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn my_listings(
        &self,
        owner: &UserId,
    ) -> Result<ListingSubscription, ListingServiceError> {
        Ok(self.repository.subscribe_by_owner(owner).await?)
    }

    /// Rewrites a draft description. Blank drafts are refused without calling out.
    pub async fn improve_description(
        &self,
        description: &str,
    ) -> Result<String, ListingServiceError> {
        if description.trim().is_empty() {
            return Err(ListingServiceError::EmptyDescription);
        }
        let request = AssistRequest::new(description, AssistKind::ImproveDescription);
        Ok(self.assistant.complete(&request).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("please enter a description first")]
    EmptyDescription,
    #[error(transparent)]
    Assistant(#[from] AssistantError),
}
