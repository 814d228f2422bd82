use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    entity::audit_logs::ActiveModel as AuditActive,
    error::AppResult,
    services::compensation::{OrphanedResource, ReconciliationHook},
};

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub actor_uid: Option<String>,
    pub action: &'static str,
    pub resource: &'static str,
    pub metadata: Option<Value>,
}

impl AuditEntry {
    pub fn new(actor_uid: Option<&str>, action: &'static str, resource: &'static str) -> Self {
        Self {
            actor_uid: actor_uid.map(str::to_owned),
            action,
            resource,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> AppResult<()>;
}

/// Audit trail kept in the `audit_logs` table.
#[derive(Clone)]
pub struct OrmAuditLog {
    conn: DatabaseConnection,
}

impl OrmAuditLog {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl AuditLog for OrmAuditLog {
    async fn record(&self, entry: AuditEntry) -> AppResult<()> {
        AuditActive {
            id: Set(Uuid::new_v4()),
            actor_uid: Set(entry.actor_uid),
            action: Set(entry.action.to_string()),
            resource: Set(entry.resource.to_string()),
            metadata: Set(entry.metadata),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.conn)
        .await?;

        Ok(())
    }
}

/// Orphans land in the audit trail so operators can find them with one query.
#[async_trait]
impl ReconciliationHook for OrmAuditLog {
    async fn record(&self, orphan: &OrphanedResource) {
        let entry = AuditEntry::new(None, "orphaned_resource", orphan.kind.as_str())
            .with_metadata(serde_json::json!(orphan));
        if let Err(err) = AuditLog::record(self, entry).await {
            tracing::error!(
                error = %err,
                reference = %orphan.reference,
                "failed to persist orphaned resource"
            );
        }
    }
}

/// Records `entry`, logging instead of failing when the write is rejected.
pub async fn log_audit(audit: &dyn AuditLog, entry: AuditEntry) {
    if let Err(err) = audit.record(entry).await {
        tracing::warn!(error = %err, "audit log failed");
    }
}
