pub mod account_service;
pub mod compensation;
pub mod cost_estimator;
pub mod document_ingestion;
pub mod order_service;
pub mod order_state_machine;
pub mod pickup_code;
pub mod print_center_service;
