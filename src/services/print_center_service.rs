use std::sync::Arc;

use uuid::Uuid;

use crate::{
    audit::{AuditEntry, AuditLog, log_audit},
    dto::centers::{CreatePrintCenterRequest, UpdatePrintCenterRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CenterStatus, PrintCenter, Role},
    store::{CenterStore, NewPrintCenter},
};

#[derive(Clone)]
pub struct PrintCenterService {
    centers: Arc<dyn CenterStore>,
    audit: Arc<dyn AuditLog>,
}

impl PrintCenterService {
    pub fn new(centers: Arc<dyn CenterStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { centers, audit }
    }

    /// New centers start out `pending` until an admin approves them.
    pub async fn register(
        &self,
        owner_uid: &str,
        request: CreatePrintCenterRequest,
    ) -> AppResult<PrintCenter> {
        request.validate()?;

        let center = self
            .centers
            .save(NewPrintCenter {
                name: request.name.trim().to_string(),
                email: request.email.trim().to_string(),
                phone_number: request.phone_number.trim().to_string(),
                owner_uid: owner_uid.to_string(),
                location: request.location,
                working_hours: request.working_hours,
            })
            .await
            .map_err(|err| err.into_app_error("print center"))?;

        tracing::info!(center_id = %center.id, owner_uid, "print center registered");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(owner_uid), "center_registered", "print_centers")
                .with_metadata(serde_json::json!({ "center_id": center.id })),
        )
        .await;

        Ok(center)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<PrintCenter> {
        self.centers
            .find_by_id(id)
            .await
            .map_err(|err| err.into_app_error("print center"))?
            .ok_or(AppError::NotFound("print center"))
    }

    /// What anonymous callers may browse: approved centers only.
    pub async fn list_public(&self) -> AppResult<Vec<PrintCenter>> {
        self.list_by_status(CenterStatus::Approved).await
    }

    pub async fn list_by_status(&self, status: CenterStatus) -> AppResult<Vec<PrintCenter>> {
        self.centers
            .find_by_status(status)
            .await
            .map_err(|err| err.into_app_error("print center"))
    }

    /// Admin listing; no filter returns every center.
    pub async fn list(&self, status: Option<CenterStatus>) -> AppResult<Vec<PrintCenter>> {
        match status {
            Some(status) => self.list_by_status(status).await,
            None => self
                .centers
                .find_all()
                .await
                .map_err(|err| err.into_app_error("print center")),
        }
    }

    /// Owners edit their own center; admins edit any.
    pub async fn update(
        &self,
        actor: &AuthUser,
        id: Uuid,
        request: UpdatePrintCenterRequest,
    ) -> AppResult<PrintCenter> {
        let center = self.get(id).await?;
        if !actor.owns(&center.owner_uid) && actor.role != Role::Admin {
            return Err(AppError::Unauthorized);
        }

        let changes = request.into_changes()?;
        if changes.is_empty() {
            return Ok(center);
        }

        let updated = self
            .centers
            .update(id, changes)
            .await
            .map_err(|err| err.into_app_error("print center"))?;

        tracing::info!(center_id = %id, "print center updated");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor.uid.as_str()), "center_updated", "print_centers")
                .with_metadata(serde_json::json!({ "center_id": id })),
        )
        .await;

        Ok(updated)
    }

    pub async fn update_status(
        &self,
        actor_uid: &str,
        id: Uuid,
        status: CenterStatus,
    ) -> AppResult<PrintCenter> {
        let center = self
            .centers
            .update_status(id, status)
            .await
            .map_err(|err| err.into_app_error("print center"))?;

        tracing::info!(center_id = %id, status = %status, "print center status updated");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor_uid), "center_status_updated", "print_centers")
                .with_metadata(serde_json::json!({ "center_id": id, "status": status })),
        )
        .await;

        Ok(center)
    }

    /// Centers with orders on record cannot be removed; suspend them instead.
    pub async fn delete(&self, actor_uid: &str, id: Uuid) -> AppResult<()> {
        self.centers
            .delete(id)
            .await
            .map_err(|err| err.into_app_error("print center"))?;

        tracing::info!(center_id = %id, "print center deleted");
        log_audit(
            self.audit.as_ref(),
            AuditEntry::new(Some(actor_uid), "center_deleted", "print_centers")
                .with_metadata(serde_json::json!({ "center_id": id })),
        )
        .await;

        Ok(())
    }
}
