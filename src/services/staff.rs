use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use anyhow::Context;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::email::{send_best_effort, staff_credentials};
use crate::{
    db_interaction::{delete_staff, insert_staff_with_login, list_staff, InsertStaffError, StaffRecord},
    domain::UserEmail,
    email_client::EmailClient,
    models::Staff,
    password::{generate_temporary_password, hash_password},
    response,
    utils::{error_fmt_chain, non_blank, DbPool},
};

#[derive(thiserror::Error)]
pub enum StaffError{
    #[error("{0}")]
    Validation(String),
    #[error("Staff member not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for StaffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for StaffError {
    fn status_code(&self) -> StatusCode {
        match self {
            StaffError::Validation(_) => StatusCode::BAD_REQUEST,
            StaffError::NotFound => StatusCode::NOT_FOUND,
            StaffError::Conflict(_) => StatusCode::CONFLICT,
            StaffError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        response::failure(self.status_code(), self)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaffInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaffCreated {
    pub staff: Staff,
    pub username: String,
    pub temporary_password: String,
    pub email_sent: bool,
}

#[tracing::instrument(
    "Listing staff",
    skip(pool)
)]
pub async fn list(pool: &DbPool) -> Result<Vec<Staff>, StaffError> {
    Ok(list_staff(pool)
        .await
        .context("Failed to list staff")?)
}

/// Creates the staff member with a generated username and temporary
/// password. Both are returned so the admin can hand them over.
#[tracing::instrument(
    "Creating staff member",
    skip(pool, email_client, login_url)
)]
pub async fn create(
    pool: &DbPool,
    email_client: &EmailClient,
    login_url: &str,
    input: StaffInput
) -> Result<StaffCreated, StaffError> {
    let first_name = non_blank(Some(input.first_name))
        .ok_or_else(|| StaffError::Validation("First name is required".to_string()))?;
    let last_name = non_blank(Some(input.last_name))
        .ok_or_else(|| StaffError::Validation("Last name is required".to_string()))?;
    let email = non_blank(input.email)
        .map(UserEmail::parse)
        .transpose()
        .map_err(StaffError::Validation)?;

    let temporary_password = generate_temporary_password();
    let password_hash = hash_password(temporary_password.clone()).await?;

    let staff = insert_staff_with_login(pool, StaffRecord {
        first_name,
        last_name,
        email: email.as_ref().map(UserEmail::inner),
        password_hash: password_hash.expose_secret().to_string(),
    })
    .await
    .map_err(|e| match e {
        InsertStaffError::NoFreeUsername(_) => StaffError::Conflict(e.to_string()),
        InsertStaffError::DbError(e) if e.is_unique_violation() => StaffError::Conflict(
            "Username was taken concurrently, please retry".to_string()
        ),
        InsertStaffError::DbError(e) => {
            StaffError::UnexpectedError(anyhow::Error::new(e).context("Failed to insert staff member"))
        }
    })?;

    let email_sent = match &email {
        Some(email) => send_best_effort(
            email_client,
            email.as_ref(),
            &staff_credentials(&staff.first_name, &staff.username, &temporary_password, login_url)
        ).await,
        None => false,
    };

    Ok(StaffCreated {
        username: staff.username.clone(),
        temporary_password: temporary_password.expose_secret().to_string(),
        staff,
        email_sent,
    })
}

#[tracing::instrument(
    "Removing staff member",
    skip(pool)
)]
pub async fn remove(pool: &DbPool, staff_id: i32) -> Result<Staff, StaffError> {
    delete_staff(pool, staff_id)
        .await
        .context("Failed to delete staff member")?
        .ok_or(StaffError::NotFound)
}
