use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use anyhow::Context;
use serde::Deserialize;

use crate::{
    db_interaction::{
        assign_driver, delete_driver, insert_driver, list_deliveries, list_drivers, set_driver_active,
        update_delivery_status, AssignDriverError, UpdateDeliveryError,
    },
    domain::DeliveryStatus,
    models::{DeliveryAssignment, Driver, NewDriver},
    response,
    utils::{error_fmt_chain, non_blank, DbPool},
};

#[derive(thiserror::Error)]
pub enum DriverError{
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for DriverError {
    fn status_code(&self) -> StatusCode {
        match self {
            DriverError::Validation(_) => StatusCode::BAD_REQUEST,
            DriverError::NotFound(_) => StatusCode::NOT_FOUND,
            DriverError::Conflict(_) => StatusCode::CONFLICT,
            DriverError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        response::failure(self.status_code(), self)
    }
}

impl From<AssignDriverError> for DriverError {
    fn from(e: AssignDriverError) -> Self {
        match e {
            AssignDriverError::DriverNotFound | AssignDriverError::OrderNotFound => {
                DriverError::NotFound(e.to_string())
            }
            AssignDriverError::DriverInactive | AssignDriverError::OrderClosed(_) => {
                DriverError::Validation(e.to_string())
            }
            AssignDriverError::AlreadyAssigned => DriverError::Conflict(e.to_string()),
            AssignDriverError::DbError(e) => {
                DriverError::UnexpectedError(anyhow::Error::new(e).context("Failed to assign driver"))
            }
        }
    }
}

impl From<UpdateDeliveryError> for DriverError {
    fn from(e: UpdateDeliveryError) -> Self {
        match e {
            UpdateDeliveryError::NotFound => DriverError::NotFound(e.to_string()),
            UpdateDeliveryError::InvalidTransition { .. } | UpdateDeliveryError::OrderClosed(_) => {
                DriverError::Validation(e.to_string())
            }
            UpdateDeliveryError::DbError(e) => {
                DriverError::UnexpectedError(anyhow::Error::new(e).context("Failed to update delivery"))
            }
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DriverInput {
    pub name: String,
    pub phone: Option<String>,
}

#[tracing::instrument(
    "Listing drivers",
    skip(pool)
)]
pub async fn list(pool: &DbPool, only_active: bool) -> Result<Vec<Driver>, DriverError> {
    Ok(list_drivers(pool, only_active)
        .await
        .context("Failed to list drivers")?)
}

#[tracing::instrument(
    "Hiring driver",
    skip(pool)
)]
pub async fn hire(pool: &DbPool, input: DriverInput) -> Result<Driver, DriverError> {
    let name = non_blank(Some(input.name))
        .ok_or_else(|| DriverError::Validation("Driver name is required".to_string()))?;

    Ok(insert_driver(pool, NewDriver {
        name,
        phone: non_blank(input.phone),
        is_active: true,
    })
    .await
    .context("Failed to insert driver")?)
}

#[tracing::instrument(
    "Setting driver availability",
    skip(pool)
)]
pub async fn set_active(pool: &DbPool, driver_id: i32, is_active: bool) -> Result<Driver, DriverError> {
    set_driver_active(pool, driver_id, is_active)
        .await
        .context("Failed to update driver")?
        .ok_or_else(|| DriverError::NotFound("Driver not found".to_string()))
}

#[tracing::instrument(
    "Removing driver",
    skip(pool)
)]
pub async fn remove(pool: &DbPool, driver_id: i32) -> Result<(), DriverError> {
    match delete_driver(pool, driver_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(DriverError::NotFound("Driver not found".to_string())),
        Err(e) if e.is_foreign_key_violation() => Err(DriverError::Conflict(
            "Driver has delivery history and cannot be deleted, deactivate instead".to_string()
        )),
        Err(e) => Err(anyhow::Error::new(e).context("Failed to delete driver").into()),
    }
}

#[tracing::instrument(
    "Assigning delivery",
    skip(pool)
)]
pub async fn assign(pool: &DbPool, order_id: i32, driver_id: i32) -> Result<DeliveryAssignment, DriverError> {
    let assignment = assign_driver(pool, order_id, driver_id).await?;
    tracing::info!(assignment_id = assignment.id, "Driver assigned");
    Ok(assignment)
}

#[tracing::instrument(
    "Changing delivery status",
    skip(pool)
)]
pub async fn change_delivery_status(
    pool: &DbPool,
    assignment_id: i32,
    status: DeliveryStatus
) -> Result<DeliveryAssignment, DriverError> {
    Ok(update_delivery_status(pool, assignment_id, status).await?)
}

#[tracing::instrument(
    "Listing deliveries",
    skip(pool)
)]
pub async fn deliveries(pool: &DbPool, driver_id: Option<i32>) -> Result<Vec<DeliveryAssignment>, DriverError> {
    Ok(list_deliveries(pool, driver_id)
        .await
        .context("Failed to list deliveries")?)
}
