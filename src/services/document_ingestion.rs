//! Staging uploaded documents in the blob store and saving the order that
//! references them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    adapters::blob::{BlobError, BlobStore},
    dto::orders::DocumentUpload,
    error::{AppError, AppResult},
    models::{Order, OrderStatus, PrintMode},
    services::{
        compensation::{
            CompensatingWrite, CompensationFailed, OrphanedResource, ReconciliationHook,
            ResourceKind, report_orphans,
        },
        pickup_code::PickupCodeGenerator,
    },
    store::{NewDocument, NewOrder, OrderStore, StoreError},
};

/// Everything about the order except its documents.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub code: String,
    pub user_uid: String,
    pub center_id: Uuid,
    pub print_mode: PrintMode,
    pub total_cost: i64,
    pub currency: String,
}

pub struct DocumentIngestion {
    blobs: Arc<dyn BlobStore>,
    orders: Arc<dyn OrderStore>,
    codes: PickupCodeGenerator,
    hook: Arc<dyn ReconciliationHook>,
    draft: OrderDraft,
    uploads: Vec<DocumentUpload>,
}

impl DocumentIngestion {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        orders: Arc<dyn OrderStore>,
        codes: PickupCodeGenerator,
        hook: Arc<dyn ReconciliationHook>,
        draft: OrderDraft,
        uploads: Vec<DocumentUpload>,
    ) -> Self {
        Self {
            blobs,
            orders,
            codes,
            hook,
            draft,
            uploads,
        }
    }

    fn new_order(&self, documents: &[NewDocument]) -> NewOrder {
        NewOrder {
            code: self.draft.code.clone(),
            user_uid: self.draft.user_uid.clone(),
            center_id: self.draft.center_id,
            status: OrderStatus::PendingPayment,
            print_mode: self.draft.print_mode,
            total_cost: self.draft.total_cost,
            currency: self.draft.currency.clone(),
            created_by: self.draft.user_uid.clone(),
            documents: documents.to_vec(),
        }
    }
}

#[async_trait]
impl CompensatingWrite for DocumentIngestion {
    type External = Vec<NewDocument>;
    type Output = Order;

    fn operation(&self) -> &'static str {
        "create_order"
    }

    async fn write_external(&mut self) -> AppResult<Vec<NewDocument>> {
        let mut staged: Vec<NewDocument> = Vec::with_capacity(self.uploads.len());

        for upload in &self.uploads {
            let path = match self
                .blobs
                .put(upload.content.clone(), &upload.file_name, &self.draft.user_uid)
                .await
            {
                Ok(path) => path,
                Err(err) => {
                    tracing::warn!(
                        file_name = %upload.file_name,
                        staged = staged.len(),
                        error = %err,
                        "document upload failed, removing staged files"
                    );
                    let paths: Vec<String> =
                        staged.iter().map(|doc| doc.storage_path.clone()).collect();
                    if let Err(failure) =
                        delete_staged(self.blobs.as_ref(), &paths, self.operation()).await
                    {
                        report_orphans(self.hook.as_ref(), &failure).await;
                    }
                    return Err(AppError::ExternalWriteFailed(format!(
                        "failed to upload file {}: {err}",
                        upload.file_name
                    )));
                }
            };

            tracing::debug!(storage_path = %path, "document staged");
            staged.push(NewDocument {
                file_name: upload.file_name.clone(),
                mime_type: upload.mime_type.clone(),
                size: upload.size(),
                storage_path: path,
                print_options: upload.print_options.clone(),
                uploaded_at: Utc::now(),
            });
        }

        Ok(staged)
    }

    async fn write_local(&mut self, documents: &Vec<NewDocument>) -> AppResult<Order> {
        let mut attempt = 1;
        loop {
            let err = match self.orders.save(self.new_order(documents)).await {
                Ok(order) => return Ok(order),
                Err(err) => err,
            };

            let constraint = match err {
                StoreError::Conflict(constraint) => constraint,
                other => return Err(other.into_app_error("order")),
            };
            if attempt >= self.codes.max_attempts() {
                return Err(AppError::ResourceExhausted(format!(
                    "pickup code still conflicting after {attempt} inserts"
                )));
            }
            attempt += 1;

            tracing::warn!(
                code = %self.draft.code,
                constraint = %constraint,
                "pickup code taken at insert, regenerating"
            );
            let orders = Arc::clone(&self.orders);
            self.draft.code = self
                .codes
                .generate(move |code| {
                    let orders = Arc::clone(&orders);
                    async move { is_code_taken(orders.as_ref(), &code).await }
                })
                .await?;
        }
    }

    async fn compensate(&mut self, documents: Vec<NewDocument>) -> Result<(), CompensationFailed> {
        let paths: Vec<String> = documents.into_iter().map(|doc| doc.storage_path).collect();
        delete_staged(self.blobs.as_ref(), &paths, self.operation()).await
    }
}

pub async fn is_code_taken(orders: &dyn OrderStore, code: &str) -> AppResult<bool> {
    orders
        .find_by_code(code)
        .await
        .map(|order| order.is_some())
        .map_err(|err| err.into_app_error("order"))
}

/// Deletes every path, continuing past failures. A path that is already gone
/// counts as deleted.
pub async fn delete_staged(
    blobs: &dyn BlobStore,
    paths: &[String],
    operation: &str,
) -> Result<(), CompensationFailed> {
    let mut orphans = Vec::new();

    for path in paths {
        match blobs.delete(path).await {
            Ok(()) | Err(BlobError::NotFound(_)) => {
                tracing::debug!(storage_path = %path, "staged document removed");
            }
            Err(err) => {
                tracing::warn!(storage_path = %path, error = %err, "failed to remove staged document");
                orphans.push(OrphanedResource {
                    kind: ResourceKind::Blob,
                    reference: path.clone(),
                    operation: operation.to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    if orphans.is_empty() {
        return Ok(());
    }

    tracing::warn!(
        operation,
        failed_count = orphans.len(),
        total = paths.len(),
        "cleanup completed with errors"
    );
    Err(CompensationFailed {
        operation: operation.to_string(),
        orphans,
    })
}
