use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::i18n::Translator;
use crate::listings::{Listing, ListingCard, ListingStatus, StatusCounts};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub users: usize,
}

impl DashboardStats {
    pub fn compute(listings: &[Listing], users: usize) -> Self {
        let counts = StatusCounts::tally(listings);
        Self {
            total: listings.len(),
            pending: counts.pending,
            approved: counts.approved,
            rejected: counts.rejected,
            users,
        }
    }
}

/// Admin dashboard: headline stats, the review queue, and the full table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub stats: DashboardStats,
    pub pending_review: Vec<ListingCard>,
    pub listings: Vec<ListingCard>,
}

impl AdminDashboard {
    pub fn build(
        listings: &[Listing],
        stats: DashboardStats,
        now: DateTime<Utc>,
        translator: &Translator,
    ) -> Self {
        let listings: Vec<ListingCard> = listings
            .iter()
            .map(|listing| ListingCard::render(listing, now, translator))
            .collect();
        let pending_review = listings
            .iter()
            .filter(|card| card.status == ListingStatus::Pending)
            .cloned()
            .collect();
        Self {
            stats,
            pending_review,
            listings,
        }
    }
}
