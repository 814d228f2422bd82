use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    adapters::{blob::BlobStore, identity::IdentityProvider},
    audit::OrmAuditLog,
    config::AppConfig,
    services::{
        account_service::AccountService, compensation::CompensatingWriteCoordinator,
        cost_estimator::CostEstimator, order_service::OrderService,
        pickup_code::PickupCodeGenerator, print_center_service::PrintCenterService,
    },
    store::orm::{OrmCenterStore, OrmOrderStore, OrmUserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
    pub centers: PrintCenterService,
    pub orders: OrderService,
}

impl AppState {
    /// Wires the database-backed stores to the given external systems.
    pub fn new(
        orm: DatabaseConnection,
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let audit = Arc::new(OrmAuditLog::new(orm.clone()));
        let coordinator = CompensatingWriteCoordinator::new(audit.clone());
        let center_store = Arc::new(OrmCenterStore::new(orm.clone()));

        let codes = PickupCodeGenerator::default().with_max_attempts(config.pickup_code_max_attempts);

        let orders = OrderService::new(
            Arc::new(OrmOrderStore::new(orm.clone())),
            center_store.clone(),
            blobs,
            audit.clone(),
            coordinator.clone(),
        )
        .with_pickup_codes(codes)
        .with_estimator(CostEstimator::new(config.price_per_page))
        .with_currency(config.currency.clone());

        let accounts = AccountService::new(
            identity,
            Arc::new(OrmUserStore::new(orm.clone())),
            audit.clone(),
            coordinator,
        );

        let centers = PrintCenterService::new(center_store, audit);

        Self {
            orm,
            config: Arc::new(config),
            accounts,
            centers,
            orders,
        }
    }
}
