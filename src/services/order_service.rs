use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    adapters::blob::BlobStore,
    audit::{AuditEntry, AuditLog, log_audit},
    dto::orders::CreateOrderRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CenterStatus, Order, OrderStatus},
    services::{
        compensation::{CompensatingWriteCoordinator, report_orphans},
        cost_estimator::CostEstimator,
        document_ingestion::{DocumentIngestion, OrderDraft, delete_staged, is_code_taken},
        order_state_machine::{can_cancel, status_timestamps, transition},
        pickup_code::PickupCodeGenerator,
    },
    store::{CenterLookup, OrderChanges, OrderStore},
};

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    centers: Arc<dyn CenterLookup>,
    blobs: Arc<dyn BlobStore>,
    audit: Arc<dyn AuditLog>,
    coordinator: CompensatingWriteCoordinator,
    codes: PickupCodeGenerator,
    estimator: CostEstimator,
    currency: String,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        centers: Arc<dyn CenterLookup>,
        blobs: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditLog>,
        coordinator: CompensatingWriteCoordinator,
    ) -> Self {
        Self {
            orders,
            centers,
            blobs,
            audit,
            coordinator,
            codes: PickupCodeGenerator::default(),
            estimator: CostEstimator::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_pickup_codes(mut self, codes: PickupCodeGenerator) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_estimator(mut self, estimator: CostEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Stages every document, then saves the order in `PENDING_PAYMENT`.
    pub async fn create_order(
        &self,
        actor: &AuthUser,
        center_id: Uuid,
        request: CreateOrderRequest,
    ) -> AppResult<Order> {
        let center = self
            .centers
            .find_by_id(center_id)
            .await
            .map_err(|err| err.into_app_error("print center"))?
            .ok_or(AppError::NotFound("print center"))?;
        if center.status != CenterStatus::Approved {
            return Err(AppError::PreconditionFailed(format!(
                "print center is {}, not accepting orders",
                center.status
            )));
        }

        if request.documents.is_empty() {
            return Err(AppError::InvalidArgument(
                "an order needs at least one document".into(),
            ));
        }
        for (index, document) in request.documents.iter().enumerate() {
            document.validate(index)?;
        }

        let total_cost = self.estimator.estimate(
            request
                .documents
                .iter()
                .map(|doc| (doc.size(), &doc.print_options)),
        );

        let orders = Arc::clone(&self.orders);
        let code = self
            .codes
            .generate(move |code| {
                let orders = Arc::clone(&orders);
                async move { is_code_taken(orders.as_ref(), &code).await }
            })
            .await?;

        let ingestion = DocumentIngestion::new(
            Arc::clone(&self.blobs),
            Arc::clone(&self.orders),
            self.codes.clone(),
            Arc::clone(self.coordinator.hook()),
            OrderDraft {
                code,
                user_uid: actor.uid.clone(),
                center_id,
                print_mode: request.print_mode,
                total_cost,
                currency: self.currency.clone(),
            },
            request.documents,
        );
        let order = self.coordinator.run(ingestion).await?;

        tracing::info!(
            order_id = %order.id,
            code = %order.code,
            documents = order.documents.len(),
            total_cost = order.total_cost,
            "order created"
        );
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor.uid.as_str()), "order_created", "orders").with_metadata(
                serde_json::json!({ "order_id": order.id, "center_id": center_id }),
            ),
        )
        .await;

        Ok(order)
    }

    pub async fn update_order_status(
        &self,
        actor: &AuthUser,
        id: Uuid,
        target: OrderStatus,
    ) -> AppResult<Order> {
        let order = self.load(id).await?;
        let status = transition(&order, target)?;

        let now = Utc::now();
        let (paid_at, cancelled_at) = status_timestamps(status, now);
        let updated = self
            .orders
            .update(
                id,
                OrderChanges {
                    status,
                    updated_by: actor.uid.clone(),
                    updated_at: now,
                    paid_at,
                    cancelled_at,
                },
            )
            .await
            .map_err(|err| err.into_app_error("order"))?;

        tracing::info!(order_id = %id, from = %order.status, to = %status, "order status updated");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor.uid.as_str()), "order_status_updated", "orders").with_metadata(
                serde_json::json!({ "order_id": id, "from": order.status, "to": status }),
            ),
        )
        .await;

        Ok(updated)
    }

    /// Owners and staff may cancel, and only before the order is paid.
    pub async fn cancel_order(&self, actor: &AuthUser, id: Uuid) -> AppResult<Order> {
        let order = self.load(id).await?;
        if !actor.owns(&order.user_uid) && !actor.role.is_privileged() {
            return Err(AppError::Unauthorized);
        }
        if !can_cancel(&order) {
            return Err(AppError::PreconditionFailed(format!(
                "order in status {} can no longer be cancelled",
                order.status
            )));
        }

        self.update_order_status(actor, id, OrderStatus::Cancelled)
            .await
    }

    /// Hard delete. Stored documents are purged afterwards on a best-effort basis.
    pub async fn delete_order(&self, actor: &AuthUser, id: Uuid) -> AppResult<()> {
        let order = self.load(id).await?;
        self.orders
            .delete(id)
            .await
            .map_err(|err| err.into_app_error("order"))?;

        let paths: Vec<String> = order
            .documents
            .iter()
            .filter(|doc| doc.storage_deleted_at.is_none())
            .map(|doc| doc.storage_path.clone())
            .collect();
        if let Err(failure) = delete_staged(self.blobs.as_ref(), &paths, "delete_order").await {
            report_orphans(self.coordinator.hook().as_ref(), &failure).await;
        }

        tracing::info!(order_id = %id, code = %order.code, "order deleted");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor.uid.as_str()), "order_deleted", "orders")
                .with_metadata(serde_json::json!({ "order_id": id, "code": order.code })),
        )
        .await;

        Ok(())
    }

    /// Owners and staff only.
    pub async fn get_order(&self, actor: &AuthUser, id: Uuid) -> AppResult<Order> {
        let order = self.load(id).await?;
        if !actor.owns(&order.user_uid) && !actor.role.is_privileged() {
            return Err(AppError::Unauthorized);
        }
        Ok(order)
    }

    pub async fn get_order_by_code(&self, code: &str) -> AppResult<Order> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() != self.codes.length() {
            return Err(AppError::InvalidArgument(format!(
                "pickup code must be {} characters",
                self.codes.length()
            )));
        }

        self.orders
            .find_by_code(&code)
            .await
            .map_err(|err| err.into_app_error("order"))?
            .ok_or(AppError::NotFound("order"))
    }

    pub async fn list_orders_for_center(&self, center_id: Uuid) -> AppResult<Vec<Order>> {
        self.centers
            .find_by_id(center_id)
            .await
            .map_err(|err| err.into_app_error("print center"))?
            .ok_or(AppError::NotFound("print center"))?;

        self.orders
            .find_by_center(center_id)
            .await
            .map_err(|err| err.into_app_error("order"))
    }

    pub async fn list_all_orders(&self, status: Option<OrderStatus>) -> AppResult<Vec<Order>> {
        let orders = self
            .orders
            .find_all()
            .await
            .map_err(|err| err.into_app_error("order"))?;

        Ok(match status {
            Some(status) => orders.into_iter().filter(|o| o.status == status).collect(),
            None => orders,
        })
    }

    async fn load(&self, id: Uuid) -> AppResult<Order> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(|err| err.into_app_error("order"))?
            .ok_or(AppError::NotFound("order"))
    }
}
