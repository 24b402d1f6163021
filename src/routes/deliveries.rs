use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    domain::DeliveryStatus,
    response,
    services::driver::{self, DriverError},
    utils::DbPool,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeliveriesQuery{
    pub driver_id: Option<i32>
}

#[tracing::instrument(
    "Listing deliveries",
    skip(pool)
)]
pub async fn get_deliveries(
    pool: web::Data<DbPool>,
    query: web::Query<DeliveriesQuery>
) -> Result<HttpResponse, DriverError> {
    let deliveries = driver::deliveries(&pool, query.driver_id).await?;
    Ok(response::ok(json!({ "deliveries": deliveries })))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssignForm{
    pub order_id: i32,
    pub driver_id: i32
}

#[tracing::instrument(
    "Assigning driver to order",
    skip(pool)
)]
pub async fn post_delivery(
    pool: web::Data<DbPool>,
    form: web::Json<AssignForm>
) -> Result<HttpResponse, DriverError> {
    let assignment = driver::assign(&pool, form.order_id, form.driver_id).await?;
    Ok(response::created(json!({ "delivery": assignment })))
}

#[derive(Deserialize, Debug)]
pub struct DeliveryStatusForm{
    pub status: DeliveryStatus
}

#[tracing::instrument(
    "Updating delivery status",
    skip(pool)
)]
pub async fn put_delivery_status(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<DeliveryStatusForm>
) -> Result<HttpResponse, DriverError> {
    let assignment = driver::change_delivery_status(&pool, path.into_inner(), form.status).await?;
    Ok(response::ok(json!({ "delivery": assignment })))
}
