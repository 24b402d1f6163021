use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    email_client::EmailClient,
    response,
    services::restaurant::{self, RegistrationRequest, RestaurantError},
    utils::DbPool,
};

#[tracing::instrument(
    "Restaurant registration started",
    skip(pool, email_client, form),
    fields(name = %form.name)
)]
pub async fn register_restaurant(
    pool: web::Data<DbPool>,
    email_client: web::Data<EmailClient>,
    form: web::Json<RegistrationRequest>
) -> Result<HttpResponse, RestaurantError> {
    let registered = restaurant::register(&pool, &email_client, form.into_inner()).await?;

    Ok(response::created(json!({
        "restaurantId": registered.restaurant_id,
        "skippedDays": registered.skipped_days,
        "emailSent": registered.email_sent,
        "message": "Registration submitted and pending approval",
    })))
}
