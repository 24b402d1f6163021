use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    pricing::PriceSummary,
    response,
    services::order::{self, OrderError, OrderRequest, QuoteRequest},
    utils::DbPool,
};

#[tracing::instrument(
    "Posting order",
    skip(pool, form),
    fields(restaurant_id = %form.restaurant_id)
)]
pub async fn post_order(
    pool: web::Data<DbPool>,
    form: web::Json<OrderRequest>
) -> Result<HttpResponse, OrderError> {
    let placed = order::place(&pool, form.into_inner()).await?;

    Ok(response::created(json!({
        "orderId": placed.order.id,
        "order": placed,
    })))
}

#[tracing::instrument(
    "Quoting cart",
    skip(form)
)]
pub async fn post_quote(
    form: web::Json<QuoteRequest>
) -> Result<HttpResponse, OrderError> {
    let summary: PriceSummary = order::quote(form.into_inner())?;
    Ok(response::ok(json!({ "quote": summary })))
}
