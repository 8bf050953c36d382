//! Identity, role, and per-user session state.

pub mod context;
pub mod directory;
pub mod domain;
pub mod memory;
pub mod provider;
pub mod registry;
pub mod router;

pub use context::{SessionContext, SessionError, SessionSnapshot};
pub use directory::UserDirectory;
pub use domain::{Identity, ProfileRecord, Role, UserId, UserProfile};
pub use memory::InMemoryAuthProvider;
pub use provider::{AuthError, AuthProvider, FederatedCredential};
pub use registry::{bearer_token, AccessError, SessionRegistry};
pub use router::session_router;
