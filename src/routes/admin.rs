use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    domain::RestaurantState,
    email_client::EmailClient,
    response,
    services::{admin, restaurant::RestaurantError},
    startup::FrontendUrl,
    utils::{non_blank, DbPool},
};

#[tracing::instrument(
    "Listing pending restaurants",
    skip(pool)
)]
pub async fn get_pending_restaurants(
    pool: web::Data<DbPool>
) -> Result<HttpResponse, RestaurantError> {
    let restaurants = admin::list_in_state(&pool, RestaurantState::Pending).await?;
    Ok(response::ok(json!({ "restaurants": restaurants })))
}

#[tracing::instrument(
    "Listing approved restaurants",
    skip(pool)
)]
pub async fn get_approved_restaurants(
    pool: web::Data<DbPool>
) -> Result<HttpResponse, RestaurantError> {
    let restaurants = admin::list_in_state(&pool, RestaurantState::Approved).await?;
    Ok(response::ok(json!({ "restaurants": restaurants })))
}

#[tracing::instrument(
    "Listing withdrawal requests",
    skip(pool)
)]
pub async fn get_withdrawal_requests(
    pool: web::Data<DbPool>
) -> Result<HttpResponse, RestaurantError> {
    let restaurants = admin::list_in_state(&pool, RestaurantState::WithdrawalPending).await?;
    Ok(response::ok(json!({ "restaurants": restaurants })))
}

#[tracing::instrument(
    "Approving restaurant registration",
    skip(pool, email_client, frontend_url)
)]
pub async fn approve_restaurant(
    pool: web::Data<DbPool>,
    email_client: web::Data<EmailClient>,
    frontend_url: web::Data<FrontendUrl>,
    path: web::Path<i32>
) -> Result<HttpResponse, RestaurantError> {
    let approval = admin::approve(
        &pool,
        &email_client,
        &frontend_url.login_url(),
        path.into_inner()
    ).await?;

    Ok(response::ok(approval))
}

#[derive(Deserialize, Debug, Default)]
pub struct RejectForm{
    pub reason: Option<String>
}

#[tracing::instrument(
    "Rejecting restaurant registration",
    skip(pool, email_client, form)
)]
pub async fn reject_restaurant(
    pool: web::Data<DbPool>,
    email_client: web::Data<EmailClient>,
    path: web::Path<i32>,
    form: Option<web::Json<RejectForm>>
) -> Result<HttpResponse, RestaurantError> {
    let reason = form.and_then(|f| non_blank(f.into_inner().reason));
    let decision = admin::reject(&pool, &email_client, path.into_inner(), reason).await?;

    Ok(response::ok(decision))
}

#[tracing::instrument(
    "Approving restaurant withdrawal",
    skip(pool, email_client)
)]
pub async fn approve_withdrawal(
    pool: web::Data<DbPool>,
    email_client: web::Data<EmailClient>,
    path: web::Path<i32>
) -> Result<HttpResponse, RestaurantError> {
    let decision = admin::approve_withdrawal(&pool, &email_client, path.into_inner()).await?;
    Ok(response::ok(decision))
}

#[tracing::instrument(
    "Rejecting restaurant withdrawal",
    skip(pool)
)]
pub async fn reject_withdrawal(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, RestaurantError> {
    let restaurant = admin::reject_withdrawal(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({ "restaurant": restaurant })))
}
