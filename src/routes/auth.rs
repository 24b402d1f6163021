use actix_web::{web, HttpResponse};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;

use crate::{response, services::auth::{self, AuthError}, utils::DbPool};

#[derive(Deserialize, Debug)]
pub struct LoginForm{
    pub username: String,
    pub password: SecretString
}

#[tracing::instrument(
    "Logging in user",
    skip(pool, form),
    fields(username = %form.username)
)]
pub async fn login(
    pool: web::Data<DbPool>,
    form: web::Json<LoginForm>
) -> Result<HttpResponse, AuthError>{
    let form = form.into_inner();
    let outcome = auth::login(&pool, form.username.trim().to_string(), form.password).await?;

    Ok(response::ok(json!({ "user": outcome })))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm{
    pub username: String,
    pub current_password: SecretString,
    pub new_password: SecretString
}

#[tracing::instrument(
    "Changing user password",
    skip(pool, form),
    fields(username = %form.username)
)]
pub async fn change_password(
    pool: web::Data<DbPool>,
    form: web::Json<ChangePasswordForm>
) -> Result<HttpResponse, AuthError>{
    let form = form.into_inner();
    auth::change_password(&pool, form.username, form.current_password, form.new_password).await?;

    Ok(response::ok(json!({ "message": "Password updated" })))
}
