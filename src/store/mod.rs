//! Narrow persistence interfaces consumed by the services.
//!
//! The services only ever see these traits; `orm` provides the sea-orm backed
//! implementations used by the server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        CenterStatus, Location, Order, OrderStatus, PrintCenter, PrintMode, PrintOptions, Role,
        User, WorkingHour,
    },
};

pub mod orm;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A unique index rejected the write; carries the violated constraint.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A foreign key still points at the row being removed.
    #[error("still referenced: {0}")]
    Referenced(String),

    #[error("invalid stored value: {0}")]
    InvalidData(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn into_app_error(self, entity: &'static str) -> AppError {
        match self {
            StoreError::NotFound => AppError::NotFound(entity),
            StoreError::Conflict(constraint) => {
                AppError::AlreadyExists(format!("{entity} already exists ({constraint})"))
            }
            StoreError::Referenced(constraint) => AppError::PreconditionFailed(format!(
                "{entity} is still referenced ({constraint})"
            )),
            StoreError::Database(err) => AppError::OrmError(err),
            StoreError::InvalidData(msg) | StoreError::Unavailable(msg) => {
                AppError::Internal(anyhow::anyhow!(msg))
            }
        }
    }
}

/// A document row that is about to be written together with its order.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_path: String,
    pub print_options: PrintOptions,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub code: String,
    pub user_uid: String,
    pub center_id: Uuid,
    pub status: OrderStatus,
    pub print_mode: PrintMode,
    pub total_cost: i64,
    pub currency: String,
    pub created_by: String,
    pub documents: Vec<NewDocument>,
}

/// Column set written when an order changes status.
#[derive(Debug, Clone)]
pub struct OrderChanges {
    pub status: OrderStatus,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order and all of its documents as one unit.
    /// A duplicate pickup code is reported as `StoreError::Conflict`.
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Order>, StoreError>;

    async fn find_by_center(&self, center_id: Uuid) -> Result<Vec<Order>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;

    async fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Order, StoreError>;

    /// Hard delete, cascading to documents.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CenterLookup: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PrintCenter>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct NewPrintCenter {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub owner_uid: String,
    pub location: Location,
    pub working_hours: Vec<WorkingHour>,
}

/// Partial center update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CenterChanges {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<Location>,
    pub working_hours: Option<Vec<WorkingHour>>,
}

impl CenterChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.location.is_none()
            && self.working_hours.is_none()
    }
}

#[async_trait]
pub trait CenterStore: CenterLookup {
    async fn save(&self, center: NewPrintCenter) -> Result<PrintCenter, StoreError>;

    async fn find_all(&self) -> Result<Vec<PrintCenter>, StoreError>;

    async fn find_by_status(&self, status: CenterStatus) -> Result<Vec<PrintCenter>, StoreError>;

    async fn update(&self, id: Uuid, changes: CenterChanges) -> Result<PrintCenter, StoreError>;

    async fn update_status(&self, id: Uuid, status: CenterStatus) -> Result<PrintCenter, StoreError>;

    /// Fails with `Referenced` while orders still point at the center.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Partial profile update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone_number.is_none()
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user keyed by the identity-provider uid.
    async fn save(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, StoreError>;

    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    async fn update_role(&self, uid: &str, role: Role) -> Result<User, StoreError>;

    async fn update_profile(&self, uid: &str, changes: ProfileChanges) -> Result<User, StoreError>;

    async fn delete(&self, uid: &str) -> Result<(), StoreError>;
}
