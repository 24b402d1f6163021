use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    response,
    services::restaurant::{self, HoursInput, RestaurantError},
    utils::DbPool,
};

#[derive(Deserialize, Debug)]
pub struct HoursForm{
    pub hours: Vec<HoursInput>
}

#[tracing::instrument(
    "Replacing restaurant hours",
    skip(pool, form)
)]
pub async fn put_hours(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<HoursForm>
) -> Result<HttpResponse, RestaurantError> {
    let replaced = restaurant::replace_hours(&pool, path.into_inner(), form.into_inner().hours).await?;
    Ok(response::ok(replaced))
}
