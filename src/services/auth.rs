use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::{
    db_interaction::{get_login, get_restaurant_account, get_staff_by_username, insert_login, update_password_hash},
    domain::UserType,
    models::{Login, NewLogin},
    password::{hash_password, verify_password},
    response,
    utils::{error_fmt_chain, DbPool},
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(thiserror::Error)]
pub enum AuthError{
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("No {0} profile is linked to this login")]
    NotProvisioned(UserType),
    #[error("New password must be at least 8 characters")]
    WeakPassword,
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::NotProvisioned(_) => StatusCode::FORBIDDEN,
            AuthError::WeakPassword => StatusCode::BAD_REQUEST,
            AuthError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        response::failure(self.status_code(), self)
    }
}

#[derive(thiserror::Error)]
pub enum CreateLoginError{
    #[error("Username {0} already exists")]
    UsernameTaken(String),
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for CreateLoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub username: String,
    pub usertype: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<i32>,
    pub must_change_password: bool,
}

/// The login of `username` if `password` matches its stored credential.
/// Unknown usernames simply do not match.
async fn verified_login(
    pool: &DbPool,
    username: &str,
    password: SecretString
) -> Result<Option<Login>, anyhow::Error> {
    let login = match get_login(pool, username.to_string())
        .await
        .context("Failed to look up login")?
    {
        Some(login) => login,
        None => {
            tracing::info!("No login registered for this username");
            return Ok(None);
        }
    };

    if !verify_password(password, login.password_hash.clone()).await? {
        tracing::info!("Passwords did not match");
        return Ok(None);
    }
    Ok(Some(login))
}

/// Returns whether `password` matches the stored credential of `username`.
#[tracing::instrument(
    "Authenticating login",
    skip(pool, password)
)]
pub async fn authenticate(
    pool: &DbPool,
    username: &str,
    password: SecretString
) -> Result<bool, anyhow::Error> {
    Ok(verified_login(pool, username, password).await?.is_some())
}

/// Authenticates and checks that the role-specific profile for the login
/// exists.
#[tracing::instrument(
    "Logging in",
    skip(pool, password)
)]
pub async fn login(
    pool: &DbPool,
    username: String,
    password: SecretString
) -> Result<LoginOutcome, AuthError> {
    let login = verified_login(pool, &username, password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let mut outcome = LoginOutcome {
        username: login.username,
        usertype: login.usertype,
        restaurant_id: None,
        staff_id: None,
        must_change_password: false,
    };

    match login.usertype {
        UserType::Restaurant => {
            let account = get_restaurant_account(pool, username)
                .await
                .context("Failed to look up restaurant account")?
                .ok_or(AuthError::NotProvisioned(UserType::Restaurant))?;
            outcome.restaurant_id = Some(account.restaurant_id);
        }
        UserType::Staff => {
            let member = get_staff_by_username(pool, username)
                .await
                .context("Failed to look up staff member")?
                .ok_or(AuthError::NotProvisioned(UserType::Staff))?;
            outcome.staff_id = Some(member.id);
            outcome.must_change_password = member.first_login;
        }
        UserType::Admin | UserType::Driver => {}
    }

    Ok(outcome)
}

#[tracing::instrument(
    "Creating login",
    skip(pool, password)
)]
pub async fn create_login(
    pool: &DbPool,
    username: String,
    password: SecretString,
    usertype: UserType
) -> Result<(), CreateLoginError> {
    let password_hash = hash_password(password).await?;

    insert_login(pool, NewLogin {
        username: username.clone(),
        password_hash: password_hash.expose_secret().to_string(),
        usertype,
    })
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            CreateLoginError::UsernameTaken(username)
        } else {
            CreateLoginError::UnexpectedError(anyhow::Error::new(e).context("Failed to insert login"))
        }
    })
}

#[tracing::instrument(
    "Changing password",
    skip(pool, current_password, new_password)
)]
pub async fn change_password(
    pool: &DbPool,
    username: String,
    current_password: SecretString,
    new_password: SecretString
) -> Result<(), AuthError> {
    if new_password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }

    if !authenticate(pool, &username, current_password).await? {
        return Err(AuthError::InvalidCredentials);
    }

    let password_hash = hash_password(new_password).await?;
    update_password_hash(pool, username, password_hash.expose_secret().to_string())
        .await
        .context("Failed to store new password hash")?;

    Ok(())
}
