//! Local Authentication
//!
//! Email/password registry with salted blake3 hashes. Stands in for the
//! hosted auth service in offline mode and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::traits::{AuthAccount, AuthProvider, BackendError, BackendResult};

const MIN_PASSWORD_LEN: usize = 6;

struct Credential {
    uid: String,
    email: String,
    salt: String,
    hash: String,
}

#[derive(Default)]
struct AuthState {
    /// Keyed by lowercase email
    accounts: HashMap<String, Credential>,
    /// Lowercase email of the signed-in account
    current: Option<String>,
}

pub struct LocalAuth {
    state: Mutex<AuthState>,
}

impl LocalAuth {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
        }
    }
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

fn auth_err(msg: &str) -> BackendError {
    BackendError::Auth(msg.to_string())
}

fn validate_email(email: &str) -> BackendResult<String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(email.to_ascii_lowercase()),
        _ => Err(auth_err("The email address is badly formatted.")),
    }
}

fn validate_password(password: &str) -> BackendResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(auth_err("The password must be 6 characters long or more."));
    }
    Ok(())
}

impl AuthState {
    fn current_credential(&self) -> BackendResult<&Credential> {
        self.current
            .as_ref()
            .and_then(|key| self.accounts.get(key))
            .ok_or_else(|| auth_err("No user is signed in."))
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthAccount> {
        let key = validate_email(email)?;
        let mut state = self.state.lock().await;
        let credential = state
            .accounts
            .get(&key)
            .ok_or_else(|| auth_err("There is no user record corresponding to this email."))?;

        if hash_password(&credential.salt, password) != credential.hash {
            return Err(auth_err("The password is invalid."));
        }

        let account = AuthAccount {
            uid: credential.uid.clone(),
            email: credential.email.clone(),
        };
        state.current = Some(key);
        Ok(account)
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthAccount> {
        let key = validate_email(email)?;
        validate_password(password)?;

        let mut state = self.state.lock().await;
        if state.accounts.contains_key(&key) {
            return Err(auth_err("The email address is already in use by another account."));
        }

        let salt = uuid::Uuid::new_v4().to_string();
        let credential = Credential {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            email: email.trim().to_string(),
            hash: hash_password(&salt, password),
            salt,
        };
        let account = AuthAccount {
            uid: credential.uid.clone(),
            email: credential.email.clone(),
        };
        state.accounts.insert(key.clone(), credential);
        state.current = Some(key);
        Ok(account)
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.state.lock().await.current = None;
        Ok(())
    }

    async fn current_account(&self) -> Option<AuthAccount> {
        let state = self.state.lock().await;
        state.current_credential().ok().map(|c| AuthAccount {
            uid: c.uid.clone(),
            email: c.email.clone(),
        })
    }

    async fn reauthenticate(&self, password: &str) -> BackendResult<()> {
        let state = self.state.lock().await;
        let credential = state.current_credential()?;
        if hash_password(&credential.salt, password) != credential.hash {
            return Err(auth_err("The password is invalid."));
        }
        Ok(())
    }

    async fn update_email(&self, new_email: &str) -> BackendResult<()> {
        let new_key = validate_email(new_email)?;
        let mut state = self.state.lock().await;
        let old_key = state
            .current
            .clone()
            .ok_or_else(|| auth_err("No user is signed in."))?;

        if new_key != old_key && state.accounts.contains_key(&new_key) {
            return Err(auth_err("The email address is already in use by another account."));
        }

        let mut credential = state
            .accounts
            .remove(&old_key)
            .ok_or_else(|| auth_err("No user is signed in."))?;
        credential.email = new_email.trim().to_string();
        state.accounts.insert(new_key.clone(), credential);
        state.current = Some(new_key);
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> BackendResult<()> {
        validate_password(new_password)?;
        let mut state = self.state.lock().await;
        let key = state
            .current
            .clone()
            .ok_or_else(|| auth_err("No user is signed in."))?;
        let credential = state
            .accounts
            .get_mut(&key)
            .ok_or_else(|| auth_err("No user is signed in."))?;
        credential.salt = uuid::Uuid::new_v4().to_string();
        credential.hash = hash_password(&credential.salt, new_password);
        Ok(())
    }

    async fn delete_account(&self) -> BackendResult<()> {
        let mut state = self.state.lock().await;
        let key = state
            .current
            .take()
            .ok_or_else(|| auth_err("No user is signed in."))?;
        state.accounts.remove(&key);
        Ok(())
    }
}
