//! Listing lifecycle, browse filtering, localization, and session
//! orchestration for the HouseRent Connect marketplace.

pub mod catalog;
pub mod config;
pub mod error;
pub mod i18n;
pub mod integrations;
pub mod listings;
pub mod moderation;
pub mod navigation;
pub mod session;
pub mod store;
pub mod telemetry;
