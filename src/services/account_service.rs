use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    adapters::identity::{AccountProfile, IdentityError, IdentityProvider},
    audit::{AuditEntry, AuditLog, log_audit},
    dto::auth::{RegisterRequest, UpdateUserRequest},
    error::{AppError, AppResult},
    models::{Role, User},
    services::compensation::{
        CompensatingWrite, CompensatingWriteCoordinator, CompensationFailed, OrphanedResource,
        ResourceKind,
    },
    store::UserStore,
};

/// Creates the provider account first, then the local user row keyed by its uid.
struct AccountProvisioning {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
    request: RegisterRequest,
}

impl AccountProvisioning {
    fn profile(&self) -> AccountProfile {
        AccountProfile {
            email: self.request.email.trim().to_string(),
            display_name: format!("{} {}", self.request.first_name.trim(), self.request.last_name.trim()),
            phone_number: self.request.phone_number.clone(),
        }
    }
}

#[async_trait]
impl CompensatingWrite for AccountProvisioning {
    type External = String;
    type Output = User;

    fn operation(&self) -> &'static str {
        "register_user"
    }

    async fn write_external(&mut self) -> AppResult<String> {
        let uid = self
            .identity
            .create_account(&self.profile(), &self.request.password)
            .await?;
        tracing::debug!(uid = %uid, "identity account created");
        Ok(uid)
    }

    async fn write_local(&mut self, uid: &String) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            uid: uid.clone(),
            role: Role::User,
            email: self.request.email.trim().to_string(),
            first_name: self.request.first_name.trim().to_string(),
            last_name: self.request.last_name.trim().to_string(),
            phone_number: self.request.phone_number.clone(),
            center_id: None,
            created_at: now,
            updated_at: now,
        };

        self.users
            .save(user)
            .await
            .map_err(|err| err.into_app_error("user"))
    }

    async fn compensate(&mut self, uid: String) -> Result<(), CompensationFailed> {
        match self.identity.delete_account(&uid).await {
            Ok(()) | Err(IdentityError::NotFound) => Ok(()),
            Err(err) => Err(CompensationFailed {
                operation: self.operation().to_string(),
                orphans: vec![OrphanedResource {
                    kind: ResourceKind::IdentityAccount,
                    reference: uid,
                    operation: self.operation().to_string(),
                    error: err.to_string(),
                }],
            }),
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
    audit: Arc<dyn AuditLog>,
    coordinator: CompensatingWriteCoordinator,
}

impl AccountService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserStore>,
        audit: Arc<dyn AuditLog>,
        coordinator: CompensatingWriteCoordinator,
    ) -> Self {
        Self {
            identity,
            users,
            audit,
            coordinator,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;

        let user = self
            .coordinator
            .run(AccountProvisioning {
                identity: Arc::clone(&self.identity),
                users: Arc::clone(&self.users),
                request,
            })
            .await?;

        tracing::info!(uid = %user.uid, "user registered");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(user.uid.as_str()), "user_register", "users")
                .with_metadata(serde_json::json!({ "email": user.email })),
        )
        .await;

        Ok(user)
    }

    pub async fn get(&self, uid: &str) -> AppResult<User> {
        self.users
            .find_by_uid(uid)
            .await
            .map_err(|err| err.into_app_error("user"))?
            .ok_or(AppError::NotFound("user"))
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.users
            .find_all()
            .await
            .map_err(|err| err.into_app_error("user"))
    }

    pub async fn update_role(&self, actor_uid: &str, uid: &str, role: Role) -> AppResult<User> {
        let user = self
            .users
            .update_role(uid, role)
            .await
            .map_err(|err| err.into_app_error("user"))?;

        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor_uid), "user_role_updated", "users")
                .with_metadata(serde_json::json!({ "uid": uid, "role": role })),
        )
        .await;

        Ok(user)
    }

    /// Edits the local profile. An empty update returns the current profile.
    pub async fn update_profile(
        &self,
        actor_uid: &str,
        uid: &str,
        request: UpdateUserRequest,
    ) -> AppResult<User> {
        let changes = request.into_changes()?;
        if changes.is_empty() {
            return self.get(uid).await;
        }

        let user = self
            .users
            .update_profile(uid, changes)
            .await
            .map_err(|err| err.into_app_error("user"))?;

        tracing::info!(uid, "user profile updated");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor_uid), "user_profile_updated", "users")
                .with_metadata(serde_json::json!({ "uid": uid })),
        )
        .await;

        Ok(user)
    }

    /// Removes the account at the provider, then the local row.
    pub async fn delete(&self, actor_uid: &str, uid: &str) -> AppResult<()> {
        match self.identity.delete_account(uid).await {
            Ok(()) => {}
            Err(IdentityError::NotFound) => {
                tracing::info!(uid, "identity account already absent, deleting local user");
            }
            Err(err) => return Err(err.into()),
        }

        self.users
            .delete(uid)
            .await
            .map_err(|err| err.into_app_error("user"))?;

        tracing::info!(uid, "user deleted");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor_uid), "user_deleted", "users")
                .with_metadata(serde_json::json!({ "uid": uid })),
        )
        .await;

        Ok(())
    }
}
