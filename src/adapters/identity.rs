use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

/// Profile data handed to the identity provider when an account is created.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub email: String,
    pub display_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("account not found")]
    NotFound,

    #[error("email already in use: {0}")]
    EmailExists(String),

    #[error("invalid account data: {0}")]
    InvalidArgument(String),

    #[error("identity provider error: {0}")]
    Provider(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound => AppError::NotFound("account"),
            IdentityError::EmailExists(_) => AppError::AlreadyExists("email already in use".into()),
            IdentityError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            IdentityError::Provider(msg) => AppError::ExternalWriteFailed(msg),
        }
    }
}

/// External system that owns credentials and issues account uids.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, profile: &AccountProfile, secret: &str) -> Result<String, IdentityError>;

    /// Reports `IdentityError::NotFound` when no account has this uid.
    async fn delete_account(&self, uid: &str) -> Result<(), IdentityError>;
}

/// Process-local provider for development setups without an external IdP.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, AccountProfile>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, uid: &str) -> bool {
        self.accounts.read().await.contains_key(uid)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_account(&self, profile: &AccountProfile, secret: &str) -> Result<String, IdentityError> {
        if secret.len() < 6 {
            return Err(IdentityError::InvalidArgument(
                "password must be at least 6 characters".into(),
            ));
        }

        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email.eq_ignore_ascii_case(&profile.email)) {
            return Err(IdentityError::EmailExists(profile.email.clone()));
        }

        let uid = Uuid::new_v4().simple().to_string();
        accounts.insert(uid.clone(), profile.clone());
        Ok(uid)
    }

    async fn delete_account(&self, uid: &str) -> Result<(), IdentityError> {
        match self.accounts.write().await.remove(uid) {
            Some(_) => Ok(()),
            None => Err(IdentityError::NotFound),
        }
    }
}
