use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    email_client::EmailClient,
    response,
    services::staff::{self, StaffError, StaffInput},
    startup::FrontendUrl,
    utils::DbPool,
};

#[tracing::instrument(
    "Listing staff",
    skip(pool)
)]
pub async fn get_staff(
    pool: web::Data<DbPool>
) -> Result<HttpResponse, StaffError> {
    let members = staff::list(&pool).await?;
    Ok(response::ok(json!({ "staff": members })))
}

#[tracing::instrument(
    "Posting staff member",
    skip(pool, email_client, frontend_url, form)
)]
pub async fn post_staff(
    pool: web::Data<DbPool>,
    email_client: web::Data<EmailClient>,
    frontend_url: web::Data<FrontendUrl>,
    form: web::Json<StaffInput>
) -> Result<HttpResponse, StaffError> {
    let created = staff::create(
        &pool,
        &email_client,
        &frontend_url.login_url(),
        form.into_inner()
    ).await?;

    Ok(response::created(created))
}

#[tracing::instrument(
    "Deleting staff member",
    skip(pool)
)]
pub async fn delete_staff(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, StaffError> {
    let removed = staff::remove(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({
        "message": format!("Staff member {} deleted", removed.username),
    })))
}
