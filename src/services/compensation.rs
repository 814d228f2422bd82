//! Writes that span an external system and the local database.
//!
//! There is no distributed transaction between the two, so every such write
//! runs external-first, local-second, and undoes the external half when the
//! local half fails. A failed undo never replaces the local error; it is
//! logged and handed to a [`ReconciliationHook`] so the orphan can be cleaned
//! up out of band.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    IdentityAccount,
    Blob,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::IdentityAccount => "identity_account",
            ResourceKind::Blob => "blob",
        }
    }
}

/// An external resource that should no longer exist but could not be removed.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanedResource {
    pub kind: ResourceKind,
    pub reference: String,
    pub operation: String,
    pub error: String,
}

#[derive(Debug, Error)]
#[error("compensation for {operation} left {} orphaned resource(s)", orphans.len())]
pub struct CompensationFailed {
    pub operation: String,
    pub orphans: Vec<OrphanedResource>,
}

/// Receives orphans left behind by failed compensations.
#[async_trait]
pub trait ReconciliationHook: Send + Sync {
    async fn record(&self, orphan: &OrphanedResource);
}

/// One dual write: an external side effect plus the local row that refers to it.
#[async_trait]
pub trait CompensatingWrite: Send {
    /// Reference returned by the external system (uid, storage paths, ...).
    type External: Send + Sync;
    type Output: Send;

    fn operation(&self) -> &'static str;

    async fn write_external(&mut self) -> AppResult<Self::External>;

    async fn write_local(&mut self, external: &Self::External) -> AppResult<Self::Output>;

    /// Best-effort undo of `write_external`.
    async fn compensate(&mut self, external: Self::External) -> Result<(), CompensationFailed>;
}

#[derive(Clone)]
pub struct CompensatingWriteCoordinator {
    hook: Arc<dyn ReconciliationHook>,
}

impl CompensatingWriteCoordinator {
    pub fn new(hook: Arc<dyn ReconciliationHook>) -> Self {
        Self { hook }
    }

    pub fn hook(&self) -> &Arc<dyn ReconciliationHook> {
        &self.hook
    }

    /// Runs `write` to completion.
    ///
    /// An external failure is returned unchanged and the local write is never
    /// attempted. A local failure is returned as `LocalWriteFailed` whether or
    /// not the compensation succeeded.
    pub async fn run<W: CompensatingWrite>(&self, mut write: W) -> AppResult<W::Output> {
        let operation = write.operation();

        let external = write.write_external().await?;

        let local_err = match write.write_local(&external).await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };

        tracing::warn!(operation, error = %local_err, "local write failed, compensating external write");
        match write.compensate(external).await {
            Ok(()) => tracing::info!(operation, "compensation completed"),
            Err(failure) => report_orphans(self.hook.as_ref(), &failure).await,
        }

        Err(AppError::local_write(
            format!("{operation}: local write failed"),
            local_err,
        ))
    }
}

/// Logs every orphan of `failure` and forwards it to `hook`.
pub async fn report_orphans(hook: &dyn ReconciliationHook, failure: &CompensationFailed) {
    for orphan in &failure.orphans {
        tracing::error!(
            operation = %failure.operation,
            kind = orphan.kind.as_str(),
            reference = %orphan.reference,
            error = %orphan.error,
            "CRITICAL: compensation failed, manual reconciliation required"
        );
        hook.record(orphan).await;
    }
}
