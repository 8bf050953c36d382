use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use super::domain::{Identity, UserId};
use super::provider::{AuthError, AuthProvider, FederatedCredential};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: UserId,
    email: String,
    password: Option<String>,
    display_name: Option<String>,
}

/// Process-local auth provider for development and tests.
///
/// Federated credentials are trusted as given; password accounts are kept in
/// memory only.
#[derive(Default)]
pub struct InMemoryAuthProvider {
    accounts: Mutex<BTreeMap<String, Account>>,
    sequence: AtomicU64,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Account>>, AuthError> {
        self.accounts
            .lock()
            .map_err(|_| AuthError::Unavailable("account table lock poisoned".to_string()))
    }

    fn issue(&self, account: &Account) -> Identity {
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed);
        Identity {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            token: format!("session-{}-{serial:06}", account.uid),
        }
    }

    fn next_uid(&self) -> UserId {
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed);
        UserId(format!("user-{serial:06}"))
    }
}

fn normalise_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalise_email(email)?;
        let accounts = self.lock()?;
        let account = accounts.get(&email).ok_or(AuthError::InvalidCredentials)?;
        if account.password.as_deref() != Some(password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.issue(account))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalise_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }

        let mut accounts = self.lock()?;
        if accounts.contains_key(&email) {
            return Err(AuthError::EmailInUse);
        }

        let account = Account {
            uid: self.next_uid(),
            email: email.clone(),
            password: Some(password.to_string()),
            display_name: None,
        };
        debug!(uid = %account.uid, "created password account");
        let identity = self.issue(&account);
        accounts.insert(email, account);
        Ok(identity)
    }

    async fn update_display_name(
        &self,
        uid: &UserId,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let mut accounts = self.lock()?;
        let account = accounts
            .values_mut()
            .find(|account| account.uid == *uid)
            .ok_or_else(|| AuthError::UnknownUser(uid.to_string()))?;
        account.display_name = Some(display_name.to_string());
        let account = account.clone();
        Ok(self.issue(&account))
    }

    async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        let email = normalise_email(&credential.email)?;
        let mut accounts = self.lock()?;
        if !accounts.contains_key(&email) {
            let account = Account {
                uid: self.next_uid(),
                email: email.clone(),
                password: None,
                display_name: credential.display_name.clone(),
            };
            debug!(uid = %account.uid, "created federated account");
            accounts.insert(email.clone(), account);
        }
        let account = accounts
            .get(&email)
            .ok_or_else(|| AuthError::UnknownUser(email.clone()))?;
        Ok(self.issue(account))
    }

    async fn sign_out(&self, _token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}
