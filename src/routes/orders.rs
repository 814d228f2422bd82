use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::UpdateOrderStatusRequest,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_privileged},
    models::Order,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_order))
        .route("/status/{code}", get(get_order_by_code))
        .route("/{id}/status", patch(update_order_status))
        .route("/{id}/cancel", post(cancel_order))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Get order with documents", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.get_order(&user, id).await?;
    Ok(Json(ApiResponse::success("OK", order, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/orders/status/{code}",
    params(("code" = String, Path, description = "Pickup code")),
    responses(
        (status = 200, description = "Order status by pickup code", body = ApiResponse<Order>),
        (status = 400, description = "Malformed pickup code"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.get_order_by_code(&code).await?;
    Ok(Json(ApiResponse::success("OK", order, Some(Meta::empty()))))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    ensure_privileged(&user)?;
    let order = state
        .orders
        .update_order_status(&user, id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success(
        "Order status updated",
        order,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Order>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found"),
        (status = 412, description = "Order can no longer be cancelled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.cancel_order(&user, id).await?;
    Ok(Json(ApiResponse::success(
        "Order cancelled",
        order,
        Some(Meta::empty()),
    )))
}
