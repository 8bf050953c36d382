//! Rental listings: the stored document model, its lifecycle, browse filters,
//! owner submissions, and the HTTP surface for visitors and owners.

pub mod document;
pub mod domain;
pub mod filter;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;
pub mod submission;
pub mod views;

pub use domain::{Listing, ListingId, ListingPatch, ListingStatus, NewListing, StatusTransition};
pub use filter::{BrowseQuery, FilterError, ListingFilter};
pub use lifecycle::LifecycleError;
pub use repository::{ListenerCount, ListingRepository, ListingSubscription, SubscriptionScope};
pub use router::listing_router;
pub use service::{ListingService, ListingServiceError};
pub use submission::{CityChoice, ListingSubmission, SubmissionError, MAX_IMAGES};
pub use views::{ListingCard, OwnerListingsView, StatusCounts};
