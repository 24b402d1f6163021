use std::{error::Error, fmt::Debug};

use chrono::Utc;
use diesel::{Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, QueryResult, RunQueryDsl, SelectableHelper};
use serde::Serialize;
use thiserror::Error;

use super::{
    delivery::{close_open_assignments, has_open_assignment},
    run_blocking, DbError,
};
use crate::{
    domain::{DeliveryStatus, OrderStatus, QueueStatus},
    models::{
        Address, Customer, DeliveryAssignment, MenuItem, NewAddress, NewCustomer, NewOrder,
        NewOrderItem, NewOrderQueueEntry, Order, OrderItem, Restaurant,
    },
    pricing::{price_cart, CartLine, PricingError},
    schema::{addresses, customers, delivery_assignments, menu_items, order_items, order_queue, orders, restaurants},
    utils::{error_fmt_chain, from_cents, DbPool},
};

pub struct OrderLine {
    pub menu_item_id: i32,
    pub quantity: u32,
}

pub struct NewOrderWithCustomer {
    pub restaurant_id: i32,
    pub customer: Option<NewCustomer>,
    pub address: Option<NewAddress>,
    pub lines: Vec<OrderLine>,
    pub tip_cents: i64,
    pub notes: Option<String>,
}

#[derive(Error)]
pub enum CreateOrderError{
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Restaurant is not accepting orders")]
    RestaurantUnavailable,
    #[error("Menu item {0} does not belong to this restaurant")]
    UnknownMenuItem(i32),
    #[error("{0} is currently unavailable")]
    ItemUnavailable(String),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    DbError(#[from] DbError)
}

impl From<diesel::result::Error> for CreateOrderError {
    fn from(e: diesel::result::Error) -> Self {
        CreateOrderError::DbError(e.into())
    }
}

impl Debug for CreateOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[derive(Error)]
pub enum UpdateOrderStatusError{
    #[error("Order not found")]
    NotFound,
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition{
        from: OrderStatus,
        to: OrderStatus
    },
    #[error("Order has no driver assigned")]
    NoDriverAssigned,
    #[error(transparent)]
    DbError(#[from] DbError)
}

impl From<diesel::result::Error> for UpdateOrderStatusError {
    fn from(e: diesel::result::Error) -> Self {
        UpdateOrderStatusError::DbError(e.into())
    }
}

impl Debug for UpdateOrderStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub customer: Option<Customer>,
    pub address: Option<Address>,
    pub deliveries: Vec<DeliveryAssignment>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub restaurant_id: Option<i32>,
}

/// Persists address, customer, order, items and the queue row in one
/// transaction. Unit prices are read from the menu.
#[tracing::instrument(
    "Creating order with customer",
    skip_all,
    fields(restaurant_id = %input.restaurant_id, lines = input.lines.len())
)]
pub async fn create_order(
    pool: &DbPool,
    input: NewOrderWithCustomer
) -> Result<OrderWithItems, CreateOrderError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<OrderWithItems, CreateOrderError, _>(|conn| {
            let restaurant = restaurants::table
                .find(input.restaurant_id)
                .select(Restaurant::as_select())
                .first::<Restaurant>(conn)
                .optional()?
                .ok_or(CreateOrderError::RestaurantNotFound)?;

            if !restaurant.accepts_orders() {
                return Err(CreateOrderError::RestaurantUnavailable);
            }

            let ids: Vec<i32> = input.lines.iter().map(|l| l.menu_item_id).collect();
            let menu: Vec<MenuItem> = menu_items::table
                .filter(menu_items::restaurant_id.eq(restaurant.id))
                .filter(menu_items::id.eq_any(&ids))
                .select(MenuItem::as_select())
                .load::<MenuItem>(conn)?;

            let mut priced = Vec::with_capacity(input.lines.len());
            for line in &input.lines {
                let item = menu.iter()
                    .find(|m| m.id == line.menu_item_id)
                    .ok_or(CreateOrderError::UnknownMenuItem(line.menu_item_id))?;
                if !item.is_available {
                    return Err(CreateOrderError::ItemUnavailable(item.name.clone()));
                }
                priced.push((item, line.quantity));
            }

            let cart: Vec<CartLine> = priced.iter()
                .map(|(item, quantity)| CartLine::new(item.price, *quantity))
                .collect();
            let totals = price_cart(&cart, input.tip_cents)?;

            let address_id = match input.address {
                Some(address) => Some(
                    diesel::insert_into(addresses::table)
                        .values(address)
                        .returning(addresses::id)
                        .get_result::<i32>(conn)?
                ),
                None => None
            };

            let customer_id = match input.customer {
                Some(customer) => Some(
                    diesel::insert_into(customers::table)
                        .values(customer)
                        .returning(customers::id)
                        .get_result::<i32>(conn)?
                ),
                None => None
            };

            let order = diesel::insert_into(orders::table)
                .values(NewOrder {
                    restaurant_id: restaurant.id,
                    customer_id,
                    address_id,
                    subtotal: from_cents(totals.subtotal_cents),
                    tax: from_cents(totals.tax_cents),
                    delivery_fee: from_cents(totals.delivery_fee_cents),
                    tip: from_cents(totals.tip_cents),
                    total: from_cents(totals.total_cents),
                    status: OrderStatus::Pending,
                    notes: input.notes,
                })
                .returning(Order::as_returning())
                .get_result::<Order>(conn)?;

            let new_items: Vec<NewOrderItem> = priced.iter()
                .map(|(item, quantity)| NewOrderItem {
                    order_id: order.id,
                    menu_item_id: Some(item.id),
                    item_name: item.name.clone(),
                    unit_price: item.price,
                    quantity: *quantity as i32,
                })
                .collect();

            let items = diesel::insert_into(order_items::table)
                .values(&new_items)
                .returning(OrderItem::as_returning())
                .get_results::<OrderItem>(conn)?;

            diesel::insert_into(order_queue::table)
                .values(NewOrderQueueEntry {
                    order_id: order.id,
                    status: QueueStatus::Queued,
                })
                .execute(conn)?;

            Ok(OrderWithItems { order, items })
        })
    })
    .await
}

#[tracing::instrument(
    "Listing orders",
    skip(pool)
)]
pub async fn list_orders(
    pool: &DbPool,
    filter: OrderFilter
) -> Result<Vec<Order>, DbError> {
    run_blocking(pool, move |conn| {
        let mut query = orders::table
            .select(Order::as_select())
            .order(orders::created_at.desc())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(orders::status.eq(status));
        }
        if let Some(restaurant_id) = filter.restaurant_id {
            query = query.filter(orders::restaurant_id.eq(restaurant_id));
        }

        Ok(query.load::<Order>(conn)?)
    })
    .await
}

#[tracing::instrument(
    "Getting order with items, customer and deliveries",
    skip(pool)
)]
pub async fn get_order_details(
    pool: &DbPool,
    order_id: i32
) -> Result<Option<OrderDetails>, DbError> {
    run_blocking(pool, move |conn| {
        let order = match orders::table
            .find(order_id)
            .select(Order::as_select())
            .first::<Order>(conn)
            .optional()?
        {
            Some(o) => o,
            None => return Ok(None)
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order_id))
            .order(order_items::id.asc())
            .select(OrderItem::as_select())
            .load::<OrderItem>(conn)?;

        let customer = match order.customer_id {
            Some(customer_id) => customers::table
                .find(customer_id)
                .select(Customer::as_select())
                .first::<Customer>(conn)
                .optional()?,
            None => None
        };

        let address = match order.address_id {
            Some(address_id) => addresses::table
                .find(address_id)
                .select(Address::as_select())
                .first::<Address>(conn)
                .optional()?,
            None => None
        };

        let deliveries = delivery_assignments::table
            .filter(delivery_assignments::order_id.eq(order_id))
            .order(delivery_assignments::assigned_at.asc())
            .select(DeliveryAssignment::as_select())
            .load::<DeliveryAssignment>(conn)?;

        Ok(Some(OrderDetails { order, items, customer, address, deliveries }))
    })
    .await
}

/// Writes the order status together with its queue row. No transition
/// checks happen here.
pub(super) fn write_order_status(
    conn: &mut PgConnection,
    order_id: i32,
    status: OrderStatus
) -> QueryResult<Order> {
    let delivered_at = (status == OrderStatus::Delivered).then(Utc::now);

    let order = diesel::update(orders::table.find(order_id))
        .set((
            orders::status.eq(status),
            orders::delivered_at.eq(delivered_at),
        ))
        .returning(Order::as_returning())
        .get_result::<Order>(conn)?;

    diesel::update(order_queue::table.filter(order_queue::order_id.eq(order_id)))
        .set((
            order_queue::status.eq(QueueStatus::for_order(status)),
            order_queue::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

    Ok(order)
}

#[tracing::instrument(
    "Updating order status",
    skip(pool)
)]
pub async fn update_order_status(
    pool: &DbPool,
    order_id: i32,
    next: OrderStatus
) -> Result<Order, UpdateOrderStatusError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<Order, UpdateOrderStatusError, _>(|conn| {
            let current: OrderStatus = orders::table
                .find(order_id)
                .select(orders::status)
                .for_update()
                .first::<OrderStatus>(conn)
                .optional()?
                .ok_or(UpdateOrderStatusError::NotFound)?;

            if !current.can_transition_to(next) {
                return Err(UpdateOrderStatusError::InvalidTransition { from: current, to: next });
            }

            match next {
                OrderStatus::OutForDelivery if !has_open_assignment(conn, order_id)? => {
                    return Err(UpdateOrderStatusError::NoDriverAssigned);
                }
                OrderStatus::Delivered => {
                    close_open_assignments(conn, order_id, DeliveryStatus::Delivered)?;
                }
                OrderStatus::Cancelled => {
                    close_open_assignments(conn, order_id, DeliveryStatus::Failed)?;
                }
                _ => {}
            }

            Ok(write_order_status(conn, order_id, next)?)
        })
    })
    .await
}
