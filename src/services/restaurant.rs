use std::{collections::HashSet, error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::email::{registration_pending, send_best_effort};
use crate::{
    db_interaction::{
        delete_menu_item, get_restaurant, get_restaurant_details, insert_menu_item, insert_registration,
        list_menu_items, list_restaurant_orders, list_restaurants_in_state, replace_restaurant_hours,
        restaurant_email_in_use, update_menu_item, RestaurantDetails, RestaurantRegistration,
    },
    domain::{RestaurantState, TransitionError, UserEmail},
    email_client::EmailClient,
    models::{
        MenuItem, MenuItemChanges, NewAddress, NewMenuItem, NewRestaurant, NewRestaurantHours, Order,
        Restaurant, RestaurantHours,
    },
    pricing::parse_amount,
    response,
    utils::{error_fmt_chain, non_blank, DbPool},
};

pub const SUNDAY: i16 = 0;

#[derive(thiserror::Error)]
pub enum RestaurantError{
    #[error("{0}")]
    Validation(String),
    #[error("Restaurant not found")]
    NotFound,
    #[error("Menu item not found")]
    MenuItemNotFound,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Restaurant was modified concurrently, please retry")]
    StateChanged,
    #[error("{0}")]
    Conflict(String),
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for RestaurantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for RestaurantError {
    fn status_code(&self) -> StatusCode {
        match self {
            RestaurantError::Validation(_) | RestaurantError::Transition(_) => StatusCode::BAD_REQUEST,
            RestaurantError::NotFound | RestaurantError::MenuItemNotFound => StatusCode::NOT_FOUND,
            RestaurantError::StateChanged | RestaurantError::Conflict(_) => StatusCode::CONFLICT,
            RestaurantError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        response::failure(self.status_code(), self)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressInput {
    pub fn parse(self) -> Result<NewAddress, String> {
        let street = non_blank(Some(self.street)).ok_or("Street is required")?;
        let city = non_blank(Some(self.city)).ok_or("City is required")?;

        Ok(NewAddress {
            street,
            city,
            state: self.state.trim().to_string(),
            zip: self.zip.trim().to_string(),
        })
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HoursInput {
    pub day_of_week: i16,
    pub open_time: String,
    pub close_time: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemInput {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

impl MenuItemInput {
    pub fn parse(self) -> Result<NewMenuItem, String> {
        let name = non_blank(Some(self.name)).ok_or("Menu item name is required")?;
        validate_price(self.price)?;

        Ok(NewMenuItem {
            restaurant_id: 0,
            name,
            description: non_blank(self.description),
            price: self.price,
            is_available: self.is_available.unwrap_or(true),
            image_url: non_blank(self.image_url),
        })
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

impl MenuItemUpdate {
    pub fn parse(self) -> Result<MenuItemChanges, String> {
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        let name = match self.name {
            Some(name) => Some(non_blank(Some(name)).ok_or("Menu item name cannot be blank")?),
            None => None,
        };

        let changes = MenuItemChanges {
            name,
            description: self.description,
            price: self.price,
            is_available: self.is_available,
            image_url: self.image_url,
        };

        if changes.name.is_none()
            && changes.description.is_none()
            && changes.price.is_none()
            && changes.is_available.is_none()
            && changes.image_url.is_none()
        {
            return Err("No menu item fields to update".to_string());
        }

        Ok(changes)
    }
}

fn validate_price(price: f64) -> Result<(), String> {
    parse_amount(price)
        .map(|_| ())
        .map_err(|e| format!("Invalid price: {}", e))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub contact_person: Option<String>,
    pub image_url: Option<String>,
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub hours: Vec<HoursInput>,
    #[serde(default)]
    pub menu: Vec<MenuItemInput>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    pub restaurant_id: i32,
    pub skipped_days: Vec<i16>,
    pub email_sent: bool,
}

/// Hours rows ready to insert plus the weekdays that could not be stored.
#[derive(Debug)]
pub struct HoursPlan {
    pub rows: Vec<NewRestaurantHours>,
    pub skipped_days: Vec<i16>,
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("{} is not a valid time, expected HH:MM", value))
}

/// Validates opening hours. Sunday cannot be stored, so Sunday entries are
/// dropped and reported back.
pub fn plan_hours(restaurant_id: i32, hours: Vec<HoursInput>) -> Result<HoursPlan, String> {
    let mut seen = HashSet::new();
    let mut plan = HoursPlan { rows: Vec::new(), skipped_days: Vec::new() };

    for entry in hours {
        if !(0..=6).contains(&entry.day_of_week) {
            return Err(format!("Day of week {} is out of range 0-6", entry.day_of_week));
        }
        if !seen.insert(entry.day_of_week) {
            return Err(format!("Day of week {} appears more than once", entry.day_of_week));
        }

        let open_time = parse_time(&entry.open_time)?;
        let close_time = parse_time(&entry.close_time)?;

        if entry.day_of_week == SUNDAY {
            tracing::warn!("Sunday opening hours are not supported and were skipped");
            plan.skipped_days.push(SUNDAY);
            continue;
        }

        plan.rows.push(NewRestaurantHours {
            restaurant_id,
            day_of_week: entry.day_of_week,
            open_time,
            close_time,
        });
    }

    Ok(plan)
}

#[tracing::instrument(
    "Registering restaurant",
    skip_all,
    fields(name = %request.name)
)]
pub async fn register(
    pool: &DbPool,
    email_client: &EmailClient,
    request: RegistrationRequest
) -> Result<Registered, RestaurantError> {
    let name = non_blank(Some(request.name))
        .ok_or_else(|| RestaurantError::Validation("Restaurant name is required".to_string()))?;
    let email = UserEmail::parse(request.email)
        .map_err(RestaurantError::Validation)?;

    let address = request.address
        .map(AddressInput::parse)
        .transpose()
        .map_err(RestaurantError::Validation)?;
    let hours = plan_hours(0, request.hours)
        .map_err(RestaurantError::Validation)?;
    let menu = request.menu
        .into_iter()
        .map(MenuItemInput::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(RestaurantError::Validation)?;

    // The email becomes the owner's login, so it may back only one restaurant
    if restaurant_email_in_use(pool, email.inner())
        .await
        .context("Failed to check restaurant email")?
    {
        return Err(RestaurantError::Conflict(
            "A restaurant with this email is already registered".to_string()
        ));
    }

    let (request_status, is_active) = RestaurantState::Pending.columns();
    let restaurant = insert_registration(pool, RestaurantRegistration {
        address,
        restaurant: NewRestaurant {
            name,
            email: email.inner(),
            phone: non_blank(request.phone),
            contact_person: non_blank(request.contact_person),
            address_id: None,
            image_url: non_blank(request.image_url),
            request_status,
            is_active,
        },
        hours: hours.rows,
        menu,
    })
    .await
    .context("Failed to insert restaurant registration")?;

    let email_sent = send_best_effort(
        email_client,
        &restaurant.email,
        &registration_pending(&restaurant.name)
    ).await;

    Ok(Registered {
        restaurant_id: restaurant.id,
        skipped_days: hours.skipped_days,
        email_sent,
    })
}

#[tracing::instrument(
    "Listing approved restaurants",
    skip(pool)
)]
pub async fn list_approved(pool: &DbPool) -> Result<Vec<Restaurant>, RestaurantError> {
    Ok(list_restaurants_in_state(pool, RestaurantState::Approved)
        .await
        .context("Failed to list approved restaurants")?)
}

#[tracing::instrument(
    "Getting restaurant details",
    skip(pool)
)]
pub async fn details(pool: &DbPool, restaurant_id: i32) -> Result<RestaurantDetails, RestaurantError> {
    get_restaurant_details(pool, restaurant_id)
        .await
        .context("Failed to get restaurant details")?
        .ok_or(RestaurantError::NotFound)
}

pub(crate) async fn require_restaurant(pool: &DbPool, restaurant_id: i32) -> Result<Restaurant, RestaurantError> {
    get_restaurant(pool, restaurant_id)
        .await
        .context("Failed to get restaurant")?
        .ok_or(RestaurantError::NotFound)
}

#[tracing::instrument(
    "Listing restaurant menu",
    skip(pool)
)]
pub async fn menu(pool: &DbPool, restaurant_id: i32) -> Result<Vec<MenuItem>, RestaurantError> {
    require_restaurant(pool, restaurant_id).await?;

    Ok(list_menu_items(pool, restaurant_id)
        .await
        .context("Failed to list menu items")?)
}

#[tracing::instrument(
    "Adding menu item",
    skip(pool, input)
)]
pub async fn add_menu_item(
    pool: &DbPool,
    restaurant_id: i32,
    input: MenuItemInput
) -> Result<MenuItem, RestaurantError> {
    let item = input.parse().map_err(RestaurantError::Validation)?;
    require_restaurant(pool, restaurant_id).await?;

    Ok(insert_menu_item(pool, NewMenuItem { restaurant_id, ..item })
        .await
        .context("Failed to insert menu item")?)
}

#[tracing::instrument(
    "Changing menu item",
    skip(pool, update)
)]
pub async fn change_menu_item(
    pool: &DbPool,
    restaurant_id: i32,
    item_id: i32,
    update: MenuItemUpdate
) -> Result<MenuItem, RestaurantError> {
    let changes = update.parse().map_err(RestaurantError::Validation)?;

    update_menu_item(pool, restaurant_id, item_id, changes)
        .await
        .context("Failed to update menu item")?
        .ok_or(RestaurantError::MenuItemNotFound)
}

#[tracing::instrument(
    "Removing menu item",
    skip(pool)
)]
pub async fn remove_menu_item(
    pool: &DbPool,
    restaurant_id: i32,
    item_id: i32
) -> Result<(), RestaurantError> {
    let deleted = delete_menu_item(pool, restaurant_id, item_id)
        .await
        .context("Failed to delete menu item")?;

    if !deleted {
        return Err(RestaurantError::MenuItemNotFound);
    }
    Ok(())
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HoursReplaced {
    pub hours: Vec<RestaurantHours>,
    pub skipped_days: Vec<i16>,
}

#[tracing::instrument(
    "Replacing opening hours",
    skip(pool, hours)
)]
pub async fn replace_hours(
    pool: &DbPool,
    restaurant_id: i32,
    hours: Vec<HoursInput>
) -> Result<HoursReplaced, RestaurantError> {
    let plan = plan_hours(restaurant_id, hours).map_err(RestaurantError::Validation)?;
    require_restaurant(pool, restaurant_id).await?;

    let hours = replace_restaurant_hours(pool, restaurant_id, plan.rows)
        .await
        .context("Failed to replace opening hours")?;

    Ok(HoursReplaced { hours, skipped_days: plan.skipped_days })
}

#[tracing::instrument(
    "Listing restaurant orders",
    skip(pool)
)]
pub async fn orders(pool: &DbPool, restaurant_id: i32) -> Result<Vec<Order>, RestaurantError> {
    require_restaurant(pool, restaurant_id).await?;

    Ok(list_restaurant_orders(pool, restaurant_id)
        .await
        .context("Failed to list restaurant orders")?)
}
