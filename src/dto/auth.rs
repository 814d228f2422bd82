use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Role, User},
    store::ProfileChanges,
};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::InvalidArgument("first and last name are required".into()));
        }
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(AppError::InvalidArgument("invalid email".into()));
        }
        if self.password.is_empty() {
            return Err(AppError::InvalidArgument("password is required".into()));
        }
        Ok(())
    }
}

/// Profile fields a user or admin may edit. Email and password belong to the
/// identity provider and are not editable here.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> AppResult<ProfileChanges> {
        let trimmed = |value: Option<String>, field: &str| -> AppResult<Option<String>> {
            match value.map(|v| v.trim().to_string()) {
                Some(v) if v.is_empty() => {
                    Err(AppError::InvalidArgument(format!("{field} cannot be empty")))
                }
                other => Ok(other),
            }
        };

        Ok(ProfileChanges {
            first_name: trimmed(self.first_name, "first name")?,
            last_name: trimmed(self.last_name, "last name")?,
            phone_number: trimmed(self.phone_number, "phone number")?,
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateUserRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}
