use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Listing, ListingId, ListingStatus};
use super::lifecycle;
use crate::catalog::{self, EnvironmentOption};
use crate::i18n::Translator;

/// Listing as rendered for a reader in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCard {
    pub id: ListingId,
    pub title: String,
    pub city: String,
    pub city_label: String,
    pub area: String,
    pub price: u64,
    pub rooms: u32,
    pub max_people: u32,
    pub environment: Vec<EnvironmentOption>,
    pub description: String,
    pub images: Vec<String>,
    pub owner_phone: String,
    pub owner_name: Option<String>,
    pub status: ListingStatus,
    pub status_label: String,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub expired: bool,
    pub days_remaining: Option<i64>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ListingCard {
    pub fn render(listing: &Listing, now: DateTime<Utc>, translator: &Translator) -> Self {
        let language = translator.language();
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            city: listing.city.clone(),
            city_label: catalog::city_label(&listing.city, language),
            area: listing.area.clone(),
            price: listing.price,
            rooms: listing.rooms,
            max_people: listing.max_people,
            environment: listing
                .environment
                .iter()
                .map(|tag| EnvironmentOption {
                    id: *tag,
                    label: tag.label(language),
                })
                .collect(),
            description: listing.description.clone(),
            images: listing.images.clone(),
            owner_phone: listing.owner_phone.clone(),
            owner_name: listing.owner_name.clone(),
            status: listing.status,
            status_label: translator.t(listing.status.label_key()).to_string(),
            hidden: listing.hidden,
            rejection_reason: listing.rejection_reason.clone(),
            expired: lifecycle::is_expired(listing, now),
            days_remaining: lifecycle::days_remaining(listing, now),
            expiry_date: listing.expiry_date,
            created_at: listing.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn tally<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Self {
        listings
            .into_iter()
            .fold(Self::default(), |mut counts, listing| {
                match listing.status {
                    ListingStatus::Pending => counts.pending += 1,
                    ListingStatus::Approved => counts.approved += 1,
                    ListingStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }
}

/// An owner's listings with per-status tab counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerListingsView {
    pub total: usize,
    pub counts: StatusCounts,
    pub listings: Vec<ListingCard>,
}

impl OwnerListingsView {
    pub fn build(listings: &[Listing], now: DateTime<Utc>, translator: &Translator) -> Self {
        Self {
            total: listings.len(),
            counts: StatusCounts::tally(listings),
            listings: listings
                .iter()
                .map(|listing| ListingCard::render(listing, now, translator))
                .collect(),
        }
    }

    pub fn with_status(&self, status: ListingStatus) -> impl Iterator<Item = &ListingCard> {
        self.listings
            .iter()
            .filter(move |card| card.status == status)
    }
}
