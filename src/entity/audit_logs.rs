use sea_orm::entity::prelude::*;
use serde_json::Value;

/// One row per audited action. `actor_uid` is empty for system events such as
/// orphaned resources left behind by a failed compensation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub actor_uid: Option<String>,
    pub action: String,
    pub resource: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Value>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
