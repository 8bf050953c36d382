use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::EnvironmentTag;
use crate::session::UserId;

/// Identifier assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Approved, Self::Rejected]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Translation key for the status badge.
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Pending => "status.pending",
            Self::Approved => "status.approved",
            Self::Rejected => "status.rejected",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One moderation decision, kept on the listing as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub from: ListingStatus,
    pub to: ListingStatus,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A rentable property as read back from the `listings` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    /// Catalog city id or free text entered by the owner.
    pub city: String,
    pub area: String,
    /// Monthly rent in ETB.
    pub price: u64,
    pub rooms: u32,
    pub max_people: u32,
    #[serde(default)]
    pub environment: BTreeSet<EnvironmentTag>,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub owner_phone: String,
    pub owner_id: UserId,
    #[serde(default)]
    pub owner_name: Option<String>,
    pub status: ListingStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub availability_duration: Option<u32>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status_history: Vec<StatusTransition>,
}

/// Validated document body written by `ListingRepository::create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    pub city: String,
    pub area: String,
    pub price: u64,
    pub rooms: u32,
    pub max_people: u32,
    pub environment: BTreeSet<EnvironmentTag>,
    pub description: String,
    pub images: Vec<String>,
    pub owner_phone: String,
    pub owner_id: UserId,
    pub owner_name: Option<String>,
    pub status: ListingStatus,
    pub hidden: bool,
    pub availability_duration: u32,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Field subset an admin may change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    pub status: Option<ListingStatus>,
    /// `Some(None)` clears the stored reason.
    pub rejection_reason: Option<Option<String>>,
    pub hidden: Option<bool>,
    pub transition: Option<StatusTransition>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.rejection_reason.is_none()
            && self.hidden.is_none()
            && self.transition.is_none()
    }

    pub fn apply(self, listing: &mut Listing) {
        if let Some(status) = self.status {
            listing.status = status;
        }
        if let Some(reason) = self.rejection_reason {
            listing.rejection_reason = reason;
        }
        if let Some(hidden) = self.hidden {
            listing.hidden = hidden;
        }
        if let Some(transition) = self.transition {
            listing.status_history.push(transition);
        }
    }
}
