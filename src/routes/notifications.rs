use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    email_client::EmailClient,
    response,
    services::email::{send_requested, NotificationError},
};

#[derive(Deserialize, Debug)]
pub struct EmailForm{
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>
}

#[tracing::instrument(
    "Sending email on request",
    skip(email_client, form),
    fields(to = %form.to)
)]
pub async fn post_email(
    email_client: web::Data<EmailClient>,
    form: web::Json<EmailForm>
) -> Result<HttpResponse, NotificationError> {
    let form = form.into_inner();
    send_requested(&email_client, form.to, form.subject, form.text, form.html).await?;

    Ok(response::ok(json!({ "message": "Email sent" })))
}
