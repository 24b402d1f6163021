use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    domain::OrderStatus,
    response,
    services::order::{self, OrderError},
    utils::DbPool,
};

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusForm{
    pub status: OrderStatus
}

#[tracing::instrument(
    "Updating order status",
    skip(pool)
)]
pub async fn update_order_status(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<UpdateOrderStatusForm>
) -> Result<HttpResponse, OrderError> {
    let updated = order::change_status(&pool, path.into_inner(), form.status).await?;
    Ok(response::ok(json!({ "order": updated })))
}
