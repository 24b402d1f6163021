use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{
    auth::{create_login, CreateLoginError},
    email::{approval_credentials, registration_rejected, send_best_effort, withdrawal_approved},
    restaurant::{require_restaurant, RestaurantError},
};
use crate::{
    db_interaction::{
        get_restaurant_account, insert_restaurant_account, list_restaurants_in_state, update_restaurant_state,
    },
    domain::{RestaurantState, Transition, UserType},
    email_client::EmailClient,
    models::{Restaurant, RestaurantAccount},
    password::generate_temporary_password,
    utils::DbPool,
};

#[tracing::instrument(
    "Listing restaurants by state",
    skip(pool)
)]
pub async fn list_in_state(
    pool: &DbPool,
    state: RestaurantState
) -> Result<Vec<Restaurant>, RestaurantError> {
    Ok(list_restaurants_in_state(pool, state)
        .await
        .context("Failed to list restaurants")?)
}

/// Applies `transition` to the restaurant's current state and persists the
/// result, failing if another request moved the restaurant first.
#[tracing::instrument(
    "Applying restaurant transition",
    skip(pool, rejection_reason)
)]
pub async fn apply_transition(
    pool: &DbPool,
    restaurant_id: i32,
    transition: Transition,
    rejection_reason: Option<String>
) -> Result<Restaurant, RestaurantError> {
    let restaurant = require_restaurant(pool, restaurant_id).await?;
    let from = restaurant.state();
    let to = from.apply(transition)?;

    update_restaurant_state(pool, restaurant_id, from, to, rejection_reason)
        .await
        .context("Failed to update restaurant state")?
        .ok_or(RestaurantError::StateChanged)
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub restaurant_id: i32,
    pub username: String,
    pub credentials_created: bool,
    pub email_sent: bool,
    /// Only present when the credentials email could not be delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// Provisions the owner login and account, approves the restaurant and
/// emails the credentials. Only the state change is allowed to fail the
/// call; an existing login or account is reused. Refuses with a conflict
/// when the owner login already manages a different restaurant.
#[tracing::instrument(
    "Approving restaurant",
    skip(pool, email_client, login_url)
)]
pub async fn approve(
    pool: &DbPool,
    email_client: &EmailClient,
    login_url: &str,
    restaurant_id: i32
) -> Result<Approval, RestaurantError> {
    let restaurant = require_restaurant(pool, restaurant_id).await?;
    restaurant.state().apply(Transition::Approve)?;

    let username = restaurant.email.clone();
    let existing_account = get_restaurant_account(pool, username.clone())
        .await
        .context("Failed to look up restaurant account")?;
    if let Some(account) = existing_account.filter(|a| a.restaurant_id != restaurant_id) {
        return Err(RestaurantError::Conflict(format!(
            "Login {} already manages restaurant {}",
            username, account.restaurant_id
        )));
    }

    let temporary_password = generate_temporary_password();

    let credentials_created = match create_login(
        pool,
        username.clone(),
        temporary_password.clone(),
        UserType::Restaurant
    ).await {
        Ok(()) => true,
        Err(CreateLoginError::UsernameTaken(_)) => {
            tracing::info!("Login already exists for restaurant owner, reusing it");
            false
        }
        Err(e) => {
            tracing::warn!(error.cause_chain = ?e, "Failed to create restaurant login");
            false
        }
    };

    let account = RestaurantAccount { username: username.clone(), restaurant_id };
    if let Err(e) = insert_restaurant_account(pool, account).await {
        if e.is_unique_violation() {
            tracing::info!("Restaurant account already linked, skipping");
        } else {
            tracing::warn!(error.cause_chain = ?e, "Failed to link restaurant account");
        }
    }

    let restaurant = apply_transition(pool, restaurant_id, Transition::Approve, None).await?;

    let password_for_email: Option<&SecretString> = credentials_created.then_some(&temporary_password);
    let email_sent = send_best_effort(
        email_client,
        &restaurant.email,
        &approval_credentials(&restaurant.name, &username, password_for_email, login_url)
    ).await;

    let temporary_password = (credentials_created && !email_sent)
        .then(|| temporary_password.expose_secret().to_string());

    Ok(Approval {
        restaurant_id,
        username,
        credentials_created,
        email_sent,
        temporary_password,
    })
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub restaurant: Restaurant,
    pub email_sent: bool,
}

#[tracing::instrument(
    "Rejecting restaurant",
    skip(pool, email_client)
)]
pub async fn reject(
    pool: &DbPool,
    email_client: &EmailClient,
    restaurant_id: i32,
    reason: Option<String>
) -> Result<Decision, RestaurantError> {
    let restaurant = apply_transition(pool, restaurant_id, Transition::Reject, reason).await?;

    let email_sent = send_best_effort(
        email_client,
        &restaurant.email,
        &registration_rejected(&restaurant.name, restaurant.rejection_reason.as_deref())
    ).await;

    Ok(Decision { restaurant, email_sent })
}

#[tracing::instrument(
    "Approving restaurant withdrawal",
    skip(pool, email_client)
)]
pub async fn approve_withdrawal(
    pool: &DbPool,
    email_client: &EmailClient,
    restaurant_id: i32
) -> Result<Decision, RestaurantError> {
    let restaurant = apply_transition(pool, restaurant_id, Transition::ApproveWithdrawal, None).await?;

    let email_sent = send_best_effort(
        email_client,
        &restaurant.email,
        &withdrawal_approved(&restaurant.name)
    ).await;

    Ok(Decision { restaurant, email_sent })
}

#[tracing::instrument(
    "Rejecting restaurant withdrawal",
    skip(pool)
)]
pub async fn reject_withdrawal(
    pool: &DbPool,
    restaurant_id: i32
) -> Result<Restaurant, RestaurantError> {
    apply_transition(pool, restaurant_id, Transition::RejectWithdrawal, None).await
}

#[tracing::instrument(
    "Requesting restaurant withdrawal",
    skip(pool)
)]
pub async fn request_withdrawal(
    pool: &DbPool,
    restaurant_id: i32
) -> Result<Restaurant, RestaurantError> {
    apply_transition(pool, restaurant_id, Transition::RequestWithdrawal, None).await
}
