//! Status, visibility, and expiry rules for listings.
//!
//! Listings start `pending`. An admin may approve or reject from any status;
//! every such decision is appended to the listing's status history. The
//! `hidden` flag is orthogonal to status. Expiry is stamped once at creation
//! and only ever read afterwards.

use chrono::{DateTime, Duration, Utc};

use super::domain::{Listing, ListingPatch, ListingStatus, StatusTransition};

pub const DEFAULT_AVAILABILITY_DAYS: u32 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("a rejection reason is required")]
    MissingRejectionReason,
}

pub const fn initial_status() -> ListingStatus {
    ListingStatus::Pending
}

pub fn expiry_for(created_at: DateTime<Utc>, availability_days: u32) -> DateTime<Utc> {
    created_at + Duration::days(i64::from(availability_days))
}

/// Public visibility: approved, not hidden, and not past its expiry.
pub fn is_visible(listing: &Listing, now: DateTime<Utc>) -> bool {
    listing.status == ListingStatus::Approved
        && !listing.hidden
        && listing.expiry_date.map_or(true, |expiry| expiry >= now)
}

pub fn is_expired(listing: &Listing, now: DateTime<Utc>) -> bool {
    listing.expiry_date.is_some_and(|expiry| expiry < now)
}

/// Whole days left before expiry, rounded up. Negative once expired.
pub fn days_remaining(listing: &Listing, now: DateTime<Utc>) -> Option<i64> {
    let expiry = listing.expiry_date?;
    let millis = (expiry - now).num_milliseconds();
    let days = if millis > 0 {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    } else {
        millis / MILLIS_PER_DAY
    };
    Some(days)
}

/// Approve from any prior status, clearing a stale rejection reason.
pub fn approve(listing: &Listing, at: DateTime<Utc>) -> ListingPatch {
    ListingPatch {
        status: Some(ListingStatus::Approved),
        rejection_reason: Some(None),
        hidden: None,
        transition: Some(StatusTransition {
            from: listing.status,
            to: ListingStatus::Approved,
            at,
            reason: None,
        }),
    }
}

/// Checked before the store is touched so a blank reason never reaches it.
pub fn validate_rejection_reason(reason: &str) -> Result<&str, LifecycleError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        Err(LifecycleError::MissingRejectionReason)
    } else {
        Ok(trimmed)
    }
}

pub fn reject(
    listing: &Listing,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<ListingPatch, LifecycleError> {
    let reason = validate_rejection_reason(reason)?.to_string();
    Ok(ListingPatch {
        status: Some(ListingStatus::Rejected),
        rejection_reason: Some(Some(reason.clone())),
        hidden: None,
        transition: Some(StatusTransition {
            from: listing.status,
            to: ListingStatus::Rejected,
            at,
            reason: Some(reason),
        }),
    })
}

pub fn set_hidden(hidden: bool) -> ListingPatch {
    ListingPatch {
        hidden: Some(hidden),
        ..ListingPatch::default()
    }
}

pub fn toggle_hidden(listing: &Listing) -> ListingPatch {
    set_hidden(!listing.hidden)
}
