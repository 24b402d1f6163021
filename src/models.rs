use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::{AsChangeset, Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::domain::{DeliveryStatus, OrderStatus, QueueStatus, RequestStatus, RestaurantState, UserType};
use crate::schema::{
    addresses, customers, delivery_assignments, drivers, logins, menu_items, order_items,
    order_queue, orders, restaurant_accounts, restaurant_hours, restaurants, staff,
};

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = addresses, check_for_backend(diesel::pg::Pg))]
pub struct Address {
    pub id: i32,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = addresses)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = restaurants, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub contact_person: Option<String>,
    pub address_id: Option<i32>,
    pub image_url: Option<String>,
    pub request_status: RequestStatus,
    pub is_active: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Restaurant {
    pub fn state(&self) -> RestaurantState {
        RestaurantState::from_columns(self.request_status, self.is_active)
    }

    pub fn accepts_orders(&self) -> bool {
        self.state() == RestaurantState::Approved
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub contact_person: Option<String>,
    pub address_id: Option<i32>,
    pub image_url: Option<String>,
    pub request_status: RequestStatus,
    pub is_active: bool,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = logins, check_for_backend(diesel::pg::Pg))]
pub struct Login {
    pub username: String,
    pub password_hash: String,
    pub usertype: UserType,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = logins)]
pub struct NewLogin {
    pub username: String,
    pub password_hash: String,
    pub usertype: UserType,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone)]
#[diesel(table_name = restaurant_accounts, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct RestaurantAccount {
    pub username: String,
    pub restaurant_id: i32,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = restaurant_hours, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct RestaurantHours {
    pub id: i32,
    pub restaurant_id: i32,
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = restaurant_hours)]
pub struct NewRestaurantHours {
    pub restaurant_id: i32,
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = menu_items, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i32,
    pub restaurant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    pub image_url: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = menu_items)]
pub struct NewMenuItem {
    pub restaurant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    pub image_url: Option<String>,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = menu_items)]
pub struct MenuItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = staff, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: Option<String>,
    pub first_login: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = staff)]
pub struct NewStaff {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: Option<String>,
    pub first_login: bool,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = drivers, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = drivers)]
pub struct NewDriver {
    pub name: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = customers, check_for_backend(diesel::pg::Pg))]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = customers)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = orders, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub restaurant_id: i32,
    pub customer_id: Option<i32>,
    pub address_id: Option<i32>,
    pub subtotal: f64,
    pub tax: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub restaurant_id: i32,
    pub customer_id: Option<i32>,
    pub address_id: Option<i32>,
    pub subtotal: f64,
    pub tax: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = order_items, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: Option<i32>,
    pub item_name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub menu_item_id: Option<i32>,
    pub item_name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = order_queue, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct OrderQueueEntry {
    pub id: i32,
    pub order_id: i32,
    pub status: QueueStatus,
    pub queued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = order_queue)]
pub struct NewOrderQueueEntry {
    pub order_id: i32,
    pub status: QueueStatus,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = delivery_assignments, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAssignment {
    pub id: i32,
    pub order_id: i32,
    pub driver_id: i32,
    pub status: DeliveryStatus,
    pub assigned_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = delivery_assignments)]
pub struct NewDeliveryAssignment {
    pub order_id: i32,
    pub driver_id: i32,
    pub status: DeliveryStatus,
}
