use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{RegisterRequest, RegisterResponse, UpdateUserRequest, UpdateUserRoleRequest, UserList},
        centers::{
            CenterList, CreatePrintCenterRequest, UpdatePrintCenterRequest,
            UpdatePrintCenterStatusRequest,
        },
        orders::{DocumentConfig, OrderList, UpdateOrderStatusRequest},
    },
    models::{
        CenterStatus, ColorMode, Document, GeoPoint, Location, Order, OrderStatus, PaperSize,
        PrintCenter, PrintMode, PrintOptions, Role, User, WorkingHour,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, centers, health, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::register,
        auth::me,
        auth::update_me,
        auth::delete_me,
        centers::register_center,
        centers::list_centers,
        centers::get_center,
        centers::update_center,
        centers::create_order,
        centers::list_center_orders,
        orders::get_order,
        orders::get_order_by_code,
        orders::update_order_status,
        orders::cancel_order,
        admin::list_all_orders,
        admin::delete_order,
        admin::list_users,
        admin::get_user,
        admin::update_user,
        admin::delete_user,
        admin::update_user_role,
        admin::list_centers,
        admin::delete_center,
        admin::update_center_status
    ),
    components(
        schemas(
            User,
            Role,
            PrintCenter,
            CenterStatus,
            Location,
            GeoPoint,
            WorkingHour,
            Order,
            OrderStatus,
            Document,
            PrintOptions,
            PrintMode,
            ColorMode,
            PaperSize,
            RegisterRequest,
            RegisterResponse,
            UpdateUserRoleRequest,
            UpdateUserRequest,
            UserList,
            CreatePrintCenterRequest,
            UpdatePrintCenterRequest,
            UpdatePrintCenterStatusRequest,
            CenterList,
            DocumentConfig,
            UpdateOrderStatusRequest,
            OrderList,
            centers::OrderUploadForm,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<PrintCenter>,
            ApiResponse<CenterList>,
            ApiResponse<User>,
            ApiResponse<UserList>,
            ApiResponse<RegisterResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Registration and the current user"),
        (name = "Centers", description = "Print center registration and lookup"),
        (name = "Orders", description = "Print orders and their lifecycle"),
        (name = "Admin", description = "Administrative endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
