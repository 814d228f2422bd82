//! Order status transitions.
//!
//! Pure functions over [`OrderStatus`]; persisting the outcome is the caller's job.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{Order, OrderStatus},
};

/// Statuses reachable in one step from `status`. Terminal statuses return an empty slice.
pub fn allowed_targets(status: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;

    match status {
        Created => &[AwaitingDocument, Cancelled],
        AwaitingDocument => &[PendingPayment, Cancelled],
        PendingPayment => &[Paid, Cancelled, Failed],
        Paid => &[AwaitingUser, ReadyToPrint, Cancelled],
        AwaitingUser => &[ReadyToPrint, Cancelled],
        ReadyToPrint => &[Printing, Cancelled],
        Printing => &[Printed, Failed],
        Printed => &[ReadyForPickup],
        ReadyForPickup => &[Completed],
        Completed | Cancelled | Failed => &[],
    }
}

pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_targets(status).is_empty()
}

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Validates moving `order` to `target` and returns the new status.
pub fn transition(order: &Order, target: OrderStatus) -> AppResult<OrderStatus> {
    if !can_transition(order.status, target) {
        return Err(AppError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }
    Ok(target)
}

/// Only orders that have not been paid for yet can be cancelled by their owner.
pub fn can_cancel(order: &Order) -> bool {
    matches!(
        order.status,
        OrderStatus::PendingPayment | OrderStatus::AwaitingDocument
    )
}

/// Timestamps stamped when an order enters `target`: `(paid_at, cancelled_at)`.
pub fn status_timestamps(
    target: OrderStatus,
    now: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match target {
        OrderStatus::Paid => (Some(now), None),
        OrderStatus::Cancelled => (None, Some(now)),
        _ => (None, None),
    }
}
