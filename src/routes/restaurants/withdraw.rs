use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    response,
    services::{admin, restaurant::RestaurantError},
    utils::DbPool,
};

#[tracing::instrument(
    "Requesting withdrawal",
    skip(pool)
)]
pub async fn request_withdrawal(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, RestaurantError> {
    let restaurant = admin::request_withdrawal(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({
        "restaurant": restaurant,
        "message": "Withdrawal request submitted",
    })))
}
