use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::auth::{RegisterRequest, RegisterResponse, UpdateUserRequest},
    error::AppResult,
    middleware::auth::{AuthUser, issue_token},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

pub fn users_router() -> Router<AppState> {
    Router::new().route("/me", get(me).patch(update_me).delete(delete_me))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email already in use"),
        (status = 502, description = "Identity provider unavailable"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisterResponse>>)> {
    let user = state.accounts.register(payload).await?;
    let token = issue_token(&state.config.jwt_secret, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Registered",
            RegisterResponse { user, token },
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let profile = state.accounts.get(&user.uid).await?;
    Ok(Json(ApiResponse::success("OK", profile, Some(Meta::empty()))))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<User>),
        (status = 400, description = "Invalid profile data"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let profile = state
        .accounts
        .update_profile(&user.uid, &user.uid, payload)
        .await?;
    Ok(Json(ApiResponse::success(
        "Profile updated",
        profile,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Account deleted at the identity provider and locally"),
        (status = 502, description = "Identity provider unavailable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn delete_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    state.accounts.delete(&user.uid, &user.uid).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "uid": user.uid }),
        Some(Meta::empty()),
    )))
}
