use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::{UpdateUserRequest, UpdateUserRoleRequest, UserList},
        centers::{CenterList, CenterListQuery, UpdatePrintCenterStatusRequest},
        orders::OrderList,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{CenterStatus, OrderStatus, PrintCenter, User},
    response::{ApiResponse, Meta, paginate},
    routes::params::OrderListQuery,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", delete(delete_order))
        .route("/users", get(list_users))
        .route("/users/{uid}", get(get_user).put(update_user).delete(delete_user))
        .route("/users/{uid}/role", patch(update_user_role))
        .route("/centers", get(list_centers))
        .route("/centers/{id}", delete(delete_center))
        .route("/centers/{id}/status", patch(update_center_status))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<OrderStatus>, Query, description = "Filter by status"),
    ),
    responses(
        (status = 200, description = "Get all orders (admin only)", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    ensure_admin(&user)?;
    let (page, per_page, offset) = query.pagination().normalize();

    let orders = state.orders.list_all_orders(query.status).await?;
    let (items, meta) = paginate(orders, page, per_page, offset);

    Ok(Json(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order and its documents deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    state.orders.delete_order(&user, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "List users", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    ensure_admin(&user)?;
    let items = state.accounts.list().await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success("Users", UserList { items }, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{uid}",
    params(("uid" = String, Path, description = "User uid")),
    responses(
        (status = 200, description = "Get user", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    ensure_admin(&user)?;
    let found = state.accounts.get(&uid).await?;
    Ok(Json(ApiResponse::success("OK", found, Some(Meta::empty()))))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{uid}",
    params(("uid" = String, Path, description = "User uid")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<User>),
        (status = 400, description = "Invalid profile data"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uid): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    ensure_admin(&user)?;
    let updated = state
        .accounts
        .update_profile(&user.uid, &uid, payload)
        .await?;
    Ok(Json(ApiResponse::success(
        "Profile updated",
        updated,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{uid}",
    params(("uid" = String, Path, description = "User uid")),
    responses(
        (status = 200, description = "User deleted at the identity provider and locally"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    state.accounts.delete(&user.uid, &uid).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "uid": uid }),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{uid}/role",
    params(("uid" = String, Path, description = "User uid")),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(uid): Path<String>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    ensure_admin(&user)?;
    let updated = state
        .accounts
        .update_role(&user.uid, &uid, payload.role)
        .await?;
    Ok(Json(ApiResponse::success(
        "Role updated",
        updated,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/admin/centers/{id}/status",
    params(("id" = Uuid, Path, description = "Print center ID")),
    request_body = UpdatePrintCenterStatusRequest,
    responses(
        (status = 200, description = "Print center status updated", body = ApiResponse<PrintCenter>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Print center not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_center_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePrintCenterStatusRequest>,
) -> AppResult<Json<ApiResponse<PrintCenter>>> {
    ensure_admin(&user)?;
    let center = state
        .centers
        .update_status(&user.uid, id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success(
        "Print center status updated",
        center,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/centers",
    params(
        ("status" = Option<CenterStatus>, Query, description = "Filter by status, default all"),
    ),
    responses(
        (status = 200, description = "List print centers in any status", body = ApiResponse<CenterList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_centers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CenterListQuery>,
) -> AppResult<Json<ApiResponse<CenterList>>> {
    ensure_admin(&user)?;
    let items = state.centers.list(query.status).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success(
        "Print centers",
        CenterList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/centers/{id}",
    params(("id" = Uuid, Path, description = "Print center ID")),
    responses(
        (status = 200, description = "Print center deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Print center not found"),
        (status = 412, description = "Print center still has orders"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_center(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    state.centers.delete(&user.uid, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    )))
}
