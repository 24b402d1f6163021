use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use anyhow::Context;
use serde::Deserialize;

use super::restaurant::AddressInput;
use crate::{
    db_interaction::{
        create_order, get_order_details, list_orders, update_order_status, CreateOrderError,
        NewOrderWithCustomer, OrderDetails, OrderFilter, OrderLine, OrderWithItems, UpdateOrderStatusError,
    },
    domain::{OrderStatus, UserEmail},
    models::{NewCustomer, Order},
    pricing::{parse_amount, price_cart, CartLine, PriceSummary},
    response,
    utils::{error_fmt_chain, non_blank, DbPool},
};

#[derive(thiserror::Error)]
pub enum OrderError{
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Rejected(String),
    #[error("Order not found")]
    NotFound,
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Validation(_) | OrderError::Rejected(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound | OrderError::RestaurantNotFound => StatusCode::NOT_FOUND,
            OrderError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        response::failure(self.status_code(), self)
    }
}

impl From<CreateOrderError> for OrderError {
    fn from(e: CreateOrderError) -> Self {
        match e {
            CreateOrderError::RestaurantNotFound => OrderError::RestaurantNotFound,
            CreateOrderError::RestaurantUnavailable
            | CreateOrderError::UnknownMenuItem(_)
            | CreateOrderError::ItemUnavailable(_)
            | CreateOrderError::Pricing(_) => OrderError::Rejected(e.to_string()),
            CreateOrderError::DbError(e) => {
                OrderError::UnexpectedError(anyhow::Error::new(e).context("Failed to create order"))
            }
        }
    }
}

impl From<UpdateOrderStatusError> for OrderError {
    fn from(e: UpdateOrderStatusError) -> Self {
        match e {
            UpdateOrderStatusError::NotFound => OrderError::NotFound,
            UpdateOrderStatusError::InvalidTransition { .. }
            | UpdateOrderStatusError::NoDriverAssigned => OrderError::Rejected(e.to_string()),
            UpdateOrderStatusError::DbError(e) => {
                OrderError::UnexpectedError(anyhow::Error::new(e).context("Failed to update order status"))
            }
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerInput {
    fn parse(self) -> Result<NewCustomer, String> {
        let name = non_blank(Some(self.name)).ok_or("Customer name is required")?;
        let email = non_blank(self.email)
            .map(UserEmail::parse)
            .transpose()?
            .map(|e| e.inner());

        Ok(NewCustomer {
            name,
            phone: non_blank(self.phone),
            email,
        })
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub menu_item_id: i32,
    pub quantity: i64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub restaurant_id: i32,
    pub customer: Option<CustomerInput>,
    pub address: Option<AddressInput>,
    pub items: Vec<OrderItemInput>,
    pub tip: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub price: f64,
    pub quantity: i64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    pub tip: Option<f64>,
}

fn quantity(value: i64) -> Result<u32, String> {
    match u32::try_from(value) {
        Ok(q) if q >= 1 && q <= 1000 => Ok(q),
        _ => Err(format!("Quantity {} must be between 1 and 1000", value)),
    }
}

fn tip_cents(tip: Option<f64>) -> Result<i64, String> {
    match tip {
        None => Ok(0),
        Some(t) => parse_amount(t).map_err(|e| format!("Invalid tip: {}", e)),
    }
}

/// Prices a client-side cart without touching the database.
pub fn quote(request: QuoteRequest) -> Result<PriceSummary, OrderError> {
    let mut lines = Vec::with_capacity(request.items.len());
    for item in request.items {
        let unit_price_cents = parse_amount(item.price)
            .map_err(|e| OrderError::Validation(format!("Invalid price: {}", e)))?;
        let quantity = quantity(item.quantity).map_err(OrderError::Validation)?;
        lines.push(CartLine { unit_price_cents, quantity: i64::from(quantity) });
    }
    let tip = tip_cents(request.tip).map_err(OrderError::Validation)?;

    let breakdown = price_cart(&lines, tip)
        .map_err(|e| OrderError::Validation(e.to_string()))?;
    Ok(breakdown.into())
}

#[tracing::instrument(
    "Placing order",
    skip_all,
    fields(restaurant_id = %request.restaurant_id)
)]
pub async fn place(pool: &DbPool, request: OrderRequest) -> Result<OrderWithItems, OrderError> {
    if request.items.is_empty() {
        return Err(OrderError::Validation("An order needs at least one item".to_string()));
    }

    let lines = request.items
        .iter()
        .map(|item| Ok(OrderLine {
            menu_item_id: item.menu_item_id,
            quantity: quantity(item.quantity)?,
        }))
        .collect::<Result<Vec<_>, String>>()
        .map_err(OrderError::Validation)?;

    let customer = request.customer
        .map(CustomerInput::parse)
        .transpose()
        .map_err(OrderError::Validation)?;
    let address = request.address
        .map(AddressInput::parse)
        .transpose()
        .map_err(OrderError::Validation)?;
    let tip_cents = tip_cents(request.tip).map_err(OrderError::Validation)?;

    let order = create_order(pool, NewOrderWithCustomer {
        restaurant_id: request.restaurant_id,
        customer,
        address,
        lines,
        tip_cents,
        notes: non_blank(request.notes),
    })
    .await?;

    tracing::info!(order_id = order.order.id, total = order.order.total, "Order placed");
    Ok(order)
}

#[tracing::instrument(
    "Listing orders",
    skip(pool)
)]
pub async fn list(pool: &DbPool, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
    Ok(list_orders(pool, filter)
        .await
        .context("Failed to list orders")?)
}

#[tracing::instrument(
    "Getting order",
    skip(pool)
)]
pub async fn get(pool: &DbPool, order_id: i32) -> Result<OrderDetails, OrderError> {
    get_order_details(pool, order_id)
        .await
        .context("Failed to get order")?
        .ok_or(OrderError::NotFound)
}

#[tracing::instrument(
    "Changing order status",
    skip(pool)
)]
pub async fn change_status(pool: &DbPool, order_id: i32, status: OrderStatus) -> Result<Order, OrderError> {
    Ok(update_order_status(pool, order_id, status).await?)
}
