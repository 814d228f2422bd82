pub mod audit_logs;
pub mod documents;
pub mod orders;
pub mod print_centers;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use documents::Entity as Documents;
pub use orders::Entity as Orders;
pub use print_centers::Entity as PrintCenters;
pub use users::Entity as Users;
