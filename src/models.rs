use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of an order. Stored and serialized in upper snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    AwaitingDocument,
    PendingPayment,
    Paid,
    AwaitingUser,
    ReadyToPrint,
    Printing,
    Printed,
    ReadyForPickup,
    Completed,
    Cancelled,
    Failed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 12] = [
        OrderStatus::Created,
        OrderStatus::AwaitingDocument,
        OrderStatus::PendingPayment,
        OrderStatus::Paid,
        OrderStatus::AwaitingUser,
        OrderStatus::ReadyToPrint,
        OrderStatus::Printing,
        OrderStatus::Printed,
        OrderStatus::ReadyForPickup,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::AwaitingDocument => "AWAITING_DOCUMENT",
            OrderStatus::PendingPayment => "PENDING_PAYMENT",
            OrderStatus::Paid => "PAID",
            OrderStatus::AwaitingUser => "AWAITING_USER",
            OrderStatus::ReadyToPrint => "READY_TO_PRINT",
            OrderStatus::Printing => "PRINTING",
            OrderStatus::Printed => "PRINTED",
            OrderStatus::ReadyForPickup => "READY_FOR_PICKUP",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid order status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CenterStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl CenterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CenterStatus::Pending => "pending",
            CenterStatus::Approved => "approved",
            CenterStatus::Rejected => "rejected",
            CenterStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for CenterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CenterStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CenterStatus::Pending),
            "approved" => Ok(CenterStatus::Approved),
            "rejected" => Ok(CenterStatus::Rejected),
            "suspended" => Ok(CenterStatus::Suspended),
            _ => Err(format!("Invalid print center status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorMode {
    Color,
    BlackAndWhite,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Color => "COLOR",
            ColorMode::BlackAndWhite => "BLACK_AND_WHITE",
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COLOR" => Ok(ColorMode::Color),
            "BLACK_AND_WHITE" => Ok(ColorMode::BlackAndWhite),
            _ => Err(format!("Invalid color mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    A6,
}

impl PaperSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSize::A3 => "A3",
            PaperSize::A4 => "A4",
            PaperSize::A5 => "A5",
            PaperSize::A6 => "A6",
        }
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A3" => Ok(PaperSize::A3),
            "A4" => Ok(PaperSize::A4),
            "A5" => Ok(PaperSize::A5),
            "A6" => Ok(PaperSize::A6),
            _ => Err(format!("Invalid paper size: {s}")),
        }
    }
}

/// Whether the center prints ahead of time or when the customer arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintMode {
    PrePrint,
    PrintUponArrival,
}

impl PrintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintMode::PrePrint => "PRE_PRINT",
            PrintMode::PrintUponArrival => "PRINT_UPON_ARRIVAL",
        }
    }
}

impl FromStr for PrintMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE_PRINT" => Ok(PrintMode::PrePrint),
            "PRINT_UPON_ARRIVAL" => Ok(PrintMode::PrintUponArrival),
            _ => Err(format!("Invalid print mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Managers and admins may act on orders they do not own.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrintOptions {
    pub copies: i32,
    /// Page selection such as `1-3,5`.
    pub pages: String,
    pub color: ColorMode,
    pub paper_size: PaperSize,
    pub double_sided: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub order_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    #[serde(skip_serializing, default)]
    pub storage_path: String,
    pub print_options: PrintOptions,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub printed_at: Option<DateTime<Utc>>,
    pub storage_deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub code: String,
    pub user_uid: String,
    pub center_id: Uuid,
    pub status: OrderStatus,
    pub print_mode: PrintMode,
    pub total_cost: i64,
    pub currency: String,
    pub pickup_time: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Postal address of a print center, optionally pinned on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub number: Option<u32>,
    /// Street kind, e.g. "Rue" or "Avenue".
    #[serde(rename = "type", default)]
    pub street_type: Option<String>,
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub geo_point: Option<GeoPoint>,
}

/// Opening window for one weekday, times as `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkingHour {
    pub day: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrintCenter {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub owner_uid: String,
    pub status: CenterStatus,
    pub location: Option<Location>,
    pub working_hours: Vec<WorkingHour>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub uid: String,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub center_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
