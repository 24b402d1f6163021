use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db_interaction::OrderFilter,
    domain::OrderStatus,
    response,
    services::order::{self, OrderError},
    utils::DbPool,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery{
    pub status: Option<OrderStatus>,
    pub restaurant_id: Option<i32>
}

#[tracing::instrument(
    "Listing orders",
    skip(pool)
)]
pub async fn get_orders(
    pool: web::Data<DbPool>,
    query: web::Query<OrdersQuery>
) -> Result<HttpResponse, OrderError> {
    let filter = OrderFilter {
        status: query.status,
        restaurant_id: query.restaurant_id,
    };
    let orders = order::list(&pool, filter).await?;

    Ok(response::ok(json!({ "orders": orders })))
}

#[tracing::instrument(
    "Getting order",
    skip(pool)
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, OrderError> {
    let details = order::get(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({ "order": details })))
}
