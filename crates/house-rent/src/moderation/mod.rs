//! Admin moderation: approve, reject, hide, delete, and the dashboard.

pub mod dashboard;
pub mod router;
pub mod service;

pub use dashboard::{AdminDashboard, DashboardStats};
pub use router::moderation_router;
pub use service::{ModerationError, ModerationService};
