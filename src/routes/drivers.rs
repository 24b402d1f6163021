use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    response,
    services::driver::{self, DriverError, DriverInput},
    utils::DbPool,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DriversQuery{
    #[serde(default)]
    pub active_only: bool
}

#[tracing::instrument(
    "Listing drivers",
    skip(pool)
)]
pub async fn get_drivers(
    pool: web::Data<DbPool>,
    query: web::Query<DriversQuery>
) -> Result<HttpResponse, DriverError> {
    let drivers = driver::list(&pool, query.active_only).await?;
    Ok(response::ok(json!({ "drivers": drivers })))
}

#[tracing::instrument(
    "Posting driver",
    skip(pool)
)]
pub async fn post_driver(
    pool: web::Data<DbPool>,
    form: web::Json<DriverInput>
) -> Result<HttpResponse, DriverError> {
    let created = driver::hire(&pool, form.into_inner()).await?;
    Ok(response::created(json!({ "driver": created })))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DriverStatusForm{
    pub is_active: bool
}

#[tracing::instrument(
    "Updating driver status",
    skip(pool)
)]
pub async fn put_driver_status(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<DriverStatusForm>
) -> Result<HttpResponse, DriverError> {
    let updated = driver::set_active(&pool, path.into_inner(), form.is_active).await?;
    Ok(response::ok(json!({ "driver": updated })))
}

#[tracing::instrument(
    "Deleting driver",
    skip(pool)
)]
pub async fn delete_driver(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, DriverError> {
    driver::remove(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({ "message": "Driver deleted" })))
}
