use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::directory::UserDirectory;
use super::domain::{Identity, ProfileRecord, Role, UserId, UserProfile};
use super::provider::{AuthError, AuthProvider, FederatedCredential};
use crate::store::StoreError;

/// Point-in-time view of a session.
///
/// A session can be logged in while its profile is still loading (or was
/// never written); role checks are false until a profile is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: false,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|profile| profile.role)
    }

    pub fn is_owner(&self) -> bool {
        self.role() == Some(Role::Owner)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The identity exists but its profile document could not be written.
    /// The account is left in place.
    #[error("account {uid} was created but its profile could not be saved: {source}")]
    ProfileWrite { uid: UserId, source: StoreError },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One user's session: current identity, cached profile, and loading flag.
pub struct SessionContext {
    auth: Arc<dyn AuthProvider>,
    directory: Arc<dyn UserDirectory>,
    state: RwLock<SessionSnapshot>,
}

impl SessionContext {
    pub fn new(auth: Arc<dyn AuthProvider>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            auth,
            directory,
            state: RwLock::new(SessionSnapshot::anonymous()),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        let identity = self.auth.sign_in(email, password).await?;
        info!(uid = %identity.uid, "signed in");
        self.identity_changed(Some(identity)).await;
        Ok(self.snapshot().await)
    }

    /// Creates the account, names it, then writes the profile document.
    ///
    /// A failed profile write is reported as [`SessionError::ProfileWrite`];
    /// the identity stays signed in without a profile.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> Result<SessionSnapshot, SessionError> {
        let identity = self.auth.create_account(email, password).await?;
        let identity = self
            .auth
            .update_display_name(&identity.uid, display_name)
            .await?;

        let record = ProfileRecord::new(&identity.email, display_name, role, Utc::now());
        let written = self.directory.create_profile(&identity.uid, record).await;
        let uid = identity.uid.clone();
        self.identity_changed(Some(identity)).await;

        match written {
            Ok(()) => {
                info!(%uid, role = role.label(), "registered account");
                Ok(self.snapshot().await)
            }
            Err(source) => {
                warn!(%uid, error = %source, "profile write failed after account creation");
                Err(SessionError::ProfileWrite { uid, source })
            }
        }
    }

    /// Federated sign-in. First-time users get an owner profile.
    pub async fn login_with_google(
        &self,
        credential: &FederatedCredential,
    ) -> Result<SessionSnapshot, SessionError> {
        let identity = self.auth.sign_in_federated(credential).await?;

        if self.directory.fetch_profile(&identity.uid).await?.is_none() {
            let name = identity.display_name.clone().unwrap_or_default();
            let record = ProfileRecord::new(&identity.email, &name, Role::Owner, Utc::now());
            self.directory
                .create_profile(&identity.uid, record)
                .await
                .map_err(|source| SessionError::ProfileWrite {
                    uid: identity.uid.clone(),
                    source,
                })?;
            info!(uid = %identity.uid, "created owner profile for federated account");
        }

        self.identity_changed(Some(identity)).await;
        Ok(self.snapshot().await)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        let token = self
            .state
            .read()
            .await
            .identity
            .as_ref()
            .map(|identity| identity.token.clone());
        if let Some(token) = token {
            self.auth.sign_out(&token).await?;
        }
        self.identity_changed(None).await;
        Ok(())
    }

    /// Applies an identity change and loads the matching profile.
    ///
    /// Readers see `loading = true` while the profile is fetched. A load that
    /// finishes after the identity has changed again is discarded.
    pub async fn identity_changed(&self, identity: Option<Identity>) {
        let Some(identity) = identity else {
            *self.state.write().await = SessionSnapshot::anonymous();
            return;
        };

        let uid = identity.uid.clone();
        {
            let mut state = self.state.write().await;
            state.identity = Some(identity.clone());
            state.profile = None;
            state.loading = true;
        }

        let profile = match self.directory.fetch_profile(&uid).await {
            Ok(Some(record)) => Some(UserProfile::resolve(&identity, record, Utc::now())),
            Ok(None) => None,
            Err(err) => {
                warn!(%uid, error = %err, "failed to load user profile");
                None
            }
        };

        let mut state = self.state.write().await;
        let current = state.identity.as_ref().map(|current| &current.uid);
        if current != Some(&uid) {
            return;
        }
        state.profile = profile;
        state.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::memory::InMemoryAuthProvider;
    use crate::store::InMemoryUserDirectory;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn context() -> (SessionContext, Arc<InMemoryUserDirectory>) {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let context = SessionContext::new(Arc::new(InMemoryAuthProvider::new()), directory.clone());
        (context, directory)
    }

    #[tokio::test]
    async fn register_writes_profile_and_logs_in() {
        let (context, directory) = context();
        let snapshot = context
            .register("admin@example.et", "secret1", "Meron", Role::Admin)
            .await
            .expect("registered");

        assert!(snapshot.is_logged_in());
        assert!(snapshot.is_admin());
        assert!(!snapshot.is_owner());
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.profile.as_ref().map(|p| p.display_name.as_str()),
            Some("Meron")
        );
        assert_eq!(directory.count_users().await, Ok(1));
    }

    #[tokio::test]
    async fn logout_clears_identity_and_profile() {
        let (context, _) = context();
        context
            .register("o@example.et", "secret1", "Owner", Role::Owner)
            .await
            .expect("registered");
        context.logout().await.expect("logout");
        assert_eq!(context.snapshot().await, SessionSnapshot::anonymous());
    }

    #[tokio::test]
    async fn login_with_wrong_password_leaves_session_anonymous() {
        let (context, _) = context();
        context
            .register("o@example.et", "secret1", "Owner", Role::Owner)
            .await
            .expect("registered");
        context.logout().await.expect("logout");

        let err = context.login("o@example.et", "nope").await.unwrap_err();
        assert!(matches!(err, SessionError::Auth(AuthError::InvalidCredentials)));
        assert!(!context.snapshot().await.is_logged_in());
    }

    #[tokio::test]
    async fn google_login_creates_owner_profile_once() {
        let (context, directory) = context();
        let credential = FederatedCredential {
            email: "g@example.et".to_string(),
            display_name: None,
        };
        let snapshot = context.login_with_google(&credential).await.expect("login");
        assert!(snapshot.is_owner());
        context.login_with_google(&credential).await.expect("login");
        assert_eq!(directory.count_users().await, Ok(1));
    }

    struct FailingDirectory;

    #[async_trait]
    impl UserDirectory for FailingDirectory {
        async fn fetch_profile(&self, _uid: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
            Ok(None)
        }

        async fn create_profile(
            &self,
            _uid: &UserId,
            _record: ProfileRecord,
        ) -> Result<(), StoreError> {
            Err(StoreError::PermissionDenied("users collection is read only".to_string()))
        }

        async fn count_users(&self) -> Result<usize, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn failed_profile_write_reports_orphaned_identity() {
        let context = SessionContext::new(
            Arc::new(InMemoryAuthProvider::new()),
            Arc::new(FailingDirectory),
        );
        let err = context
            .register("x@example.et", "secret1", "X", Role::Owner)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ProfileWrite { .. }));

        let snapshot = context.snapshot().await;
        assert!(snapshot.is_logged_in());
        assert!(snapshot.profile.is_none());
        assert!(!snapshot.is_owner());
    }

    struct GatedDirectory {
        inner: InMemoryUserDirectory,
        gate: Notify,
    }

    #[async_trait]
    impl UserDirectory for GatedDirectory {
        async fn fetch_profile(&self, uid: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
            self.gate.notified().await;
            self.inner.fetch_profile(uid).await
        }

        async fn create_profile(
            &self,
            uid: &UserId,
            record: ProfileRecord,
        ) -> Result<(), StoreError> {
            self.inner.create_profile(uid, record).await
        }

        async fn count_users(&self) -> Result<usize, StoreError> {
            self.inner.count_users().await
        }
    }

    #[tokio::test]
    async fn session_reports_loading_while_profile_is_fetched() {
        let directory = Arc::new(GatedDirectory {
            inner: InMemoryUserDirectory::new(),
            gate: Notify::new(),
        });
        let context = Arc::new(SessionContext::new(
            Arc::new(InMemoryAuthProvider::new()),
            directory.clone(),
        ));
        let identity = Identity {
            uid: UserId("u-1".to_string()),
            email: "u@example.et".to_string(),
            display_name: None,
            token: "t".to_string(),
        };

        let pending = tokio::spawn({
            let context = context.clone();
            async move { context.identity_changed(Some(identity)).await }
        });

        loop {
            if context.snapshot().await.loading {
                break;
            }
            tokio::task::yield_now().await;
        }
        let snapshot = context.snapshot().await;
        assert!(snapshot.is_logged_in());
        assert!(snapshot.profile.is_none());
        assert!(!snapshot.is_owner() && !snapshot.is_admin());

        directory.gate.notify_one();
        pending.await.expect("profile load finishes");
        assert!(!context.snapshot().await.loading);
    }
}
