use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    response,
    services::restaurant::{self, RestaurantError},
    utils::DbPool,
};

#[tracing::instrument(
    "Listing restaurants open for orders",
    skip(pool)
)]
pub async fn get_restaurants(
    pool: web::Data<DbPool>
) -> Result<HttpResponse, RestaurantError> {
    let restaurants = restaurant::list_approved(&pool).await?;
    Ok(response::ok(json!({ "restaurants": restaurants })))
}

#[tracing::instrument(
    "Getting restaurant",
    skip(pool)
)]
pub async fn get_restaurant(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, RestaurantError> {
    let details = restaurant::details(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({ "restaurant": details })))
}

#[tracing::instrument(
    "Getting restaurant orders",
    skip(pool)
)]
pub async fn get_restaurant_orders(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, RestaurantError> {
    let orders = restaurant::orders(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({ "orders": orders })))
}
