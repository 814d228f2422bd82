use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod centers;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;

// State is supplied once at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", auth::users_router())
        .nest("/centers", centers::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
}
