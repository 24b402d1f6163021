use std::{error::Error, fmt::Debug};

use chrono::Utc;
use diesel::{
    Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, QueryResult, RunQueryDsl,
    SelectableHelper,
};
use thiserror::Error;

use super::{orders::write_order_status, run_blocking, DbError};
use crate::{
    domain::{DeliveryStatus, OrderStatus},
    models::{DeliveryAssignment, Driver, NewDeliveryAssignment},
    schema::{delivery_assignments, drivers, orders},
    utils::{error_fmt_chain, DbPool},
};

#[derive(Error)]
pub enum AssignDriverError{
    #[error("Driver not found")]
    DriverNotFound,
    #[error("Driver is not active")]
    DriverInactive,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Order is already {0}")]
    OrderClosed(OrderStatus),
    #[error("Order already has a driver assigned")]
    AlreadyAssigned,
    #[error(transparent)]
    DbError(#[from] DbError)
}

impl From<diesel::result::Error> for AssignDriverError {
    fn from(e: diesel::result::Error) -> Self {
        AssignDriverError::DbError(e.into())
    }
}

impl Debug for AssignDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[derive(Error)]
pub enum UpdateDeliveryError{
    #[error("Delivery not found")]
    NotFound,
    #[error("Cannot move delivery from {from} to {to}")]
    InvalidTransition{
        from: DeliveryStatus,
        to: DeliveryStatus
    },
    #[error("Order is already {0}")]
    OrderClosed(OrderStatus),
    #[error(transparent)]
    DbError(#[from] DbError)
}

impl From<diesel::result::Error> for UpdateDeliveryError {
    fn from(e: diesel::result::Error) -> Self {
        UpdateDeliveryError::DbError(e.into())
    }
}

impl Debug for UpdateDeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

const OPEN: [DeliveryStatus; 2] = [DeliveryStatus::Assigned, DeliveryStatus::PickedUp];

pub(super) fn has_open_assignment(conn: &mut PgConnection, order_id: i32) -> QueryResult<bool> {
    let open: i64 = delivery_assignments::table
        .filter(delivery_assignments::order_id.eq(order_id))
        .filter(delivery_assignments::status.eq_any(OPEN))
        .count()
        .get_result(conn)?;
    Ok(open > 0)
}

/// Settles every open assignment of an order that has just become final.
pub(super) fn close_open_assignments(
    conn: &mut PgConnection,
    order_id: i32,
    outcome: DeliveryStatus
) -> QueryResult<usize> {
    let delivered_at = (outcome == DeliveryStatus::Delivered).then(Utc::now);

    diesel::update(
        delivery_assignments::table
            .filter(delivery_assignments::order_id.eq(order_id))
            .filter(delivery_assignments::status.eq_any(OPEN))
    )
    .set((
        delivery_assignments::status.eq(outcome),
        delivery_assignments::delivered_at.eq(delivered_at),
    ))
    .execute(conn)
}

#[tracing::instrument(
    "Assigning driver to order",
    skip(pool)
)]
pub async fn assign_driver(
    pool: &DbPool,
    order_id: i32,
    driver_id: i32
) -> Result<DeliveryAssignment, AssignDriverError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<DeliveryAssignment, AssignDriverError, _>(|conn| {
            let driver = drivers::table
                .find(driver_id)
                .select(Driver::as_select())
                .first::<Driver>(conn)
                .optional()?
                .ok_or(AssignDriverError::DriverNotFound)?;

            if !driver.is_active {
                return Err(AssignDriverError::DriverInactive);
            }

            let status: OrderStatus = orders::table
                .find(order_id)
                .select(orders::status)
                .for_update()
                .first::<OrderStatus>(conn)
                .optional()?
                .ok_or(AssignDriverError::OrderNotFound)?;

            if status.is_final() {
                return Err(AssignDriverError::OrderClosed(status));
            }

            if has_open_assignment(conn, order_id)? {
                return Err(AssignDriverError::AlreadyAssigned);
            }

            let assignment = diesel::insert_into(delivery_assignments::table)
                .values(NewDeliveryAssignment {
                    order_id,
                    driver_id,
                    status: DeliveryStatus::Assigned,
                })
                .returning(DeliveryAssignment::as_returning())
                .get_result::<DeliveryAssignment>(conn)?;

            write_order_status(conn, order_id, OrderStatus::OutForDelivery)?;

            Ok(assignment)
        })
    })
    .await
}

/// Advances a delivery. `delivered` closes the order; `failed` hands it back
/// to the kitchen as `ready` so another driver can take it.
#[tracing::instrument(
    "Updating delivery status",
    skip(pool)
)]
pub async fn update_delivery_status(
    pool: &DbPool,
    assignment_id: i32,
    next: DeliveryStatus
) -> Result<DeliveryAssignment, UpdateDeliveryError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<DeliveryAssignment, UpdateDeliveryError, _>(|conn| {
            // Lock the order before the assignment, same order as status updates
            let order_id: i32 = delivery_assignments::table
                .find(assignment_id)
                .select(delivery_assignments::order_id)
                .first::<i32>(conn)
                .optional()?
                .ok_or(UpdateDeliveryError::NotFound)?;

            let order_status: OrderStatus = orders::table
                .find(order_id)
                .select(orders::status)
                .for_update()
                .first::<OrderStatus>(conn)?;

            let current = delivery_assignments::table
                .find(assignment_id)
                .select(DeliveryAssignment::as_select())
                .for_update()
                .first::<DeliveryAssignment>(conn)?;

            if !current.status.can_transition_to(next) {
                return Err(UpdateDeliveryError::InvalidTransition { from: current.status, to: next });
            }
            if order_status.is_final() {
                return Err(UpdateDeliveryError::OrderClosed(order_status));
            }

            let delivered_at = (next == DeliveryStatus::Delivered).then(Utc::now);
            let updated = diesel::update(delivery_assignments::table.find(assignment_id))
                .set((
                    delivery_assignments::status.eq(next),
                    delivery_assignments::delivered_at.eq(delivered_at),
                ))
                .returning(DeliveryAssignment::as_returning())
                .get_result::<DeliveryAssignment>(conn)?;

            match next {
                DeliveryStatus::Delivered => {
                    write_order_status(conn, order_id, OrderStatus::Delivered)?;
                }
                DeliveryStatus::Failed if order_status == OrderStatus::OutForDelivery => {
                    write_order_status(conn, order_id, OrderStatus::Ready)?;
                }
                _ => {}
            }

            Ok(updated)
        })
    })
    .await
}

#[tracing::instrument(
    "Listing deliveries",
    skip(pool)
)]
pub async fn list_deliveries(
    pool: &DbPool,
    driver_id: Option<i32>
) -> Result<Vec<DeliveryAssignment>, DbError> {
    run_blocking(pool, move |conn| {
        let mut query = delivery_assignments::table
            .select(DeliveryAssignment::as_select())
            .order(delivery_assignments::assigned_at.desc())
            .into_boxed();

        if let Some(driver_id) = driver_id {
            query = query.filter(delivery_assignments::driver_id.eq(driver_id));
        }

        Ok(query.load::<DeliveryAssignment>(conn)?)
    })
    .await
}
