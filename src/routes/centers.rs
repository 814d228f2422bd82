use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        centers::{CenterList, CreatePrintCenterRequest, UpdatePrintCenterRequest},
        orders::{CreateOrderRequest, DocumentConfig, DocumentUpload, OrderList},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_privileged},
    models::{Order, PrintCenter},
    response::{ApiResponse, Meta},
    state::AppState,
};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Shape of the multipart body accepted by `POST /api/centers/{id}/orders`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct OrderUploadForm {
    #[schema(value_type = Vec<String>, format = Binary)]
    files: Vec<Vec<u8>>,
    /// JSON array with one entry per file, in upload order.
    document_configs: Vec<DocumentConfig>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_center).get(list_centers))
        .route("/{id}", get(get_center).put(update_center))
        .route("/{id}/orders", post(create_order).get(list_center_orders))
}

#[utoipa::path(
    post,
    path = "/api/centers",
    request_body = CreatePrintCenterRequest,
    responses(
        (status = 201, description = "Print center registered, pending approval", body = ApiResponse<PrintCenter>),
        (status = 400, description = "Invalid center data"),
    ),
    security(("bearer_auth" = [])),
    tag = "Centers"
)]
pub async fn register_center(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePrintCenterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PrintCenter>>)> {
    let center = state.centers.register(&user.uid, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Print center registered",
            center,
            Some(Meta::empty()),
        )),
    ))
}

// Other statuses are listed under /api/admin/centers.
#[utoipa::path(
    get,
    path = "/api/centers",
    responses(
        (status = 200, description = "List approved print centers", body = ApiResponse<CenterList>),
    ),
    tag = "Centers"
)]
pub async fn list_centers(State(state): State<AppState>) -> AppResult<Json<ApiResponse<CenterList>>> {
    let items = state.centers.list_public().await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success(
        "Print centers",
        CenterList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/centers/{id}",
    params(("id" = Uuid, Path, description = "Print center ID")),
    responses(
        (status = 200, description = "Get print center", body = ApiResponse<PrintCenter>),
        (status = 404, description = "Print center not found"),
    ),
    tag = "Centers"
)]
pub async fn get_center(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PrintCenter>>> {
    let center = state.centers.get(id).await?;
    Ok(Json(ApiResponse::success("OK", center, Some(Meta::empty()))))
}

#[utoipa::path(
    put,
    path = "/api/centers/{id}",
    params(("id" = Uuid, Path, description = "Print center ID")),
    request_body = UpdatePrintCenterRequest,
    responses(
        (status = 200, description = "Print center updated", body = ApiResponse<PrintCenter>),
        (status = 400, description = "Invalid center data"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Print center not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Centers"
)]
pub async fn update_center(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePrintCenterRequest>,
) -> AppResult<Json<ApiResponse<PrintCenter>>> {
    let center = state.centers.update(&user, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Print center updated",
        center,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/centers/{id}/orders",
    params(("id" = Uuid, Path, description = "Print center ID")),
    request_body(content = OrderUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Order created", body = ApiResponse<Order>),
        (status = 400, description = "Invalid upload"),
        (status = 404, description = "Print center not found"),
        (status = 412, description = "Print center not approved"),
        (status = 502, description = "Document storage failed"),
        (status = 503, description = "No free pickup code"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(center_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let request = read_order_upload(&mut multipart).await?;
    let order = state.orders.create_order(&user, center_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Order created", order, Some(Meta::empty()))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/centers/{id}/orders",
    params(("id" = Uuid, Path, description = "Print center ID")),
    responses(
        (status = 200, description = "Orders placed at a print center", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Print center not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_center_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(center_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    ensure_privileged(&user)?;
    let items = state.orders.list_orders_for_center(center_id).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(meta),
    )))
}

/// Collects the `files` parts and pairs them with `document_configs` by position.
async fn read_order_upload(multipart: &mut Multipart) -> AppResult<CreateOrderRequest> {
    let mut files = Vec::new();
    let mut configs: Option<Vec<DocumentConfig>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "files[]" => {
                let file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .ok_or_else(|| AppError::InvalidArgument("file part without a file name".into()))?;
                let mime_type = field
                    .content_type()
                    .map(str::to_owned)
                    .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
                let content = field.bytes().await.map_err(|e| {
                    AppError::InvalidArgument(format!("failed to read {file_name}: {e}"))
                })?;
                files.push((file_name, mime_type, content));
            }
            "document_configs" => {
                let raw = field.text().await.map_err(|e| {
                    AppError::InvalidArgument(format!("failed to read document_configs: {e}"))
                })?;
                let parsed = serde_json::from_str(&raw).map_err(|e| {
                    AppError::InvalidArgument(format!("invalid document_configs: {e}"))
                })?;
                configs = Some(parsed);
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let configs =
        configs.ok_or_else(|| AppError::InvalidArgument("document_configs is required".into()))?;
    if files.is_empty() {
        return Err(AppError::InvalidArgument("at least one file is required".into()));
    }
    if configs.len() != files.len() {
        return Err(AppError::InvalidArgument(format!(
            "got {} files but {} document configs",
            files.len(),
            configs.len()
        )));
    }

    let print_mode = configs[0].print_mode;
    if configs.iter().any(|c| c.print_mode != print_mode) {
        return Err(AppError::InvalidArgument(
            "all documents of an order must share one print mode".into(),
        ));
    }

    let documents = files
        .into_iter()
        .zip(configs)
        .map(|((file_name, mime_type, content), config)| DocumentUpload {
            file_name,
            mime_type,
            content,
            print_options: config.print_options,
        })
        .collect();

    Ok(CreateOrderRequest {
        print_mode,
        documents,
    })
}
