use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};
use serde::Serialize;

use super::{run_blocking, DbError};
use crate::{
    domain::{RequestStatus, RestaurantState},
    models::{
        Address, MenuItem, NewAddress, NewMenuItem, NewRestaurant, NewRestaurantHours, Order,
        Restaurant, RestaurantHours,
    },
    schema::{addresses, menu_items, orders, restaurant_hours, restaurants},
    utils::DbPool,
};

/// Everything persisted by a registration. `restaurant_id` fields of the
/// nested rows are filled in once the restaurant row exists.
pub struct RestaurantRegistration {
    pub address: Option<NewAddress>,
    pub restaurant: NewRestaurant,
    pub hours: Vec<NewRestaurantHours>,
    pub menu: Vec<NewMenuItem>,
}

#[tracing::instrument(
    "Inserting restaurant registration",
    skip_all,
    fields(name = %registration.restaurant.name)
)]
pub async fn insert_registration(
    pool: &DbPool,
    registration: RestaurantRegistration
) -> Result<Restaurant, DbError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<Restaurant, DbError, _>(|conn| {
            let RestaurantRegistration { address, mut restaurant, hours, menu } = registration;

            if let Some(address) = address {
                let address_id: i32 = diesel::insert_into(addresses::table)
                    .values(address)
                    .returning(addresses::id)
                    .get_result(conn)?;
                restaurant.address_id = Some(address_id);
            }

            let restaurant: Restaurant = diesel::insert_into(restaurants::table)
                .values(restaurant)
                .returning(Restaurant::as_returning())
                .get_result(conn)?;

            let hours: Vec<NewRestaurantHours> = hours.into_iter()
                .map(|h| NewRestaurantHours { restaurant_id: restaurant.id, ..h })
                .collect();
            if !hours.is_empty() {
                diesel::insert_into(restaurant_hours::table)
                    .values(&hours)
                    .execute(conn)?;
            }

            let menu: Vec<NewMenuItem> = menu.into_iter()
                .map(|m| NewMenuItem { restaurant_id: restaurant.id, ..m })
                .collect();
            if !menu.is_empty() {
                diesel::insert_into(menu_items::table)
                    .values(&menu)
                    .execute(conn)?;
            }

            Ok(restaurant)
        })
    })
    .await
}

#[tracing::instrument(
    "Getting restaurant by id",
    skip(pool)
)]
pub async fn get_restaurant(
    pool: &DbPool,
    restaurant_id: i32
) -> Result<Option<Restaurant>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(restaurants::table
            .find(restaurant_id)
            .select(Restaurant::as_select())
            .first::<Restaurant>(conn)
            .optional()?)
    })
    .await
}

/// Whether a restaurant that was not rejected already registered `email`.
#[tracing::instrument(
    "Checking restaurant email",
    skip(pool)
)]
pub async fn restaurant_email_in_use(
    pool: &DbPool,
    email: String
) -> Result<bool, DbError> {
    run_blocking(pool, move |conn| {
        let count: i64 = restaurants::table
            .filter(restaurants::email.eq(email))
            .filter(restaurants::request_status.ne(RequestStatus::Rejected))
            .count()
            .get_result(conn)?;
        Ok(count > 0)
    })
    .await
}

#[tracing::instrument(
    "Listing restaurants in state",
    skip(pool)
)]
pub async fn list_restaurants_in_state(
    pool: &DbPool,
    state: RestaurantState
) -> Result<Vec<Restaurant>, DbError> {
    let (status, active) = state.columns();

    run_blocking(pool, move |conn| {
        Ok(restaurants::table
            .filter(restaurants::request_status.eq(status))
            .filter(restaurants::is_active.eq(active))
            .order(restaurants::created_at.asc())
            .select(Restaurant::as_select())
            .load::<Restaurant>(conn)?)
    })
    .await
}

/// Moves a restaurant from `from` to `to` only if it is still in `from`.
/// Returns `None` when the row changed underneath us.
#[tracing::instrument(
    "Updating restaurant state",
    skip(pool, rejection_reason)
)]
pub async fn update_restaurant_state(
    pool: &DbPool,
    restaurant_id: i32,
    from: RestaurantState,
    to: RestaurantState,
    rejection_reason: Option<String>
) -> Result<Option<Restaurant>, DbError> {
    let (from_status, from_active) = from.columns();
    let (to_status, to_active) = to.columns();

    run_blocking(pool, move |conn| {
        Ok(diesel::update(restaurants::table.find(restaurant_id))
            .filter(restaurants::request_status.eq(from_status))
            .filter(restaurants::is_active.eq(from_active))
            .set((
                restaurants::request_status.eq(to_status),
                restaurants::is_active.eq(to_active),
                restaurants::rejection_reason.eq(rejection_reason),
            ))
            .returning(Restaurant::as_returning())
            .get_result::<Restaurant>(conn)
            .optional()?)
    })
    .await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetails {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub address: Option<Address>,
    pub hours: Vec<RestaurantHours>,
    pub menu: Vec<MenuItem>,
}

#[tracing::instrument(
    "Getting restaurant with address, hours and menu",
    skip(pool)
)]
pub async fn get_restaurant_details(
    pool: &DbPool,
    restaurant_id: i32
) -> Result<Option<RestaurantDetails>, DbError> {
    run_blocking(pool, move |conn| {
        let restaurant = match restaurants::table
            .find(restaurant_id)
            .select(Restaurant::as_select())
            .first::<Restaurant>(conn)
            .optional()?
        {
            Some(r) => r,
            None => return Ok(None)
        };

        let address = match restaurant.address_id {
            Some(address_id) => addresses::table
                .find(address_id)
                .select(Address::as_select())
                .first::<Address>(conn)
                .optional()?,
            None => None
        };

        let hours = restaurant_hours::table
            .filter(restaurant_hours::restaurant_id.eq(restaurant_id))
            .order(restaurant_hours::day_of_week.asc())
            .select(RestaurantHours::as_select())
            .load::<RestaurantHours>(conn)?;

        let menu = menu_items::table
            .filter(menu_items::restaurant_id.eq(restaurant_id))
            .order(menu_items::id.asc())
            .select(MenuItem::as_select())
            .load::<MenuItem>(conn)?;

        Ok(Some(RestaurantDetails { restaurant, address, hours, menu }))
    })
    .await
}

#[tracing::instrument(
    "Replacing restaurant hours",
    skip(pool, hours)
)]
pub async fn replace_restaurant_hours(
    pool: &DbPool,
    restaurant_id: i32,
    hours: Vec<NewRestaurantHours>
) -> Result<Vec<RestaurantHours>, DbError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<Vec<RestaurantHours>, DbError, _>(|conn| {
            diesel::delete(
                restaurant_hours::table.filter(restaurant_hours::restaurant_id.eq(restaurant_id))
            )
            .execute(conn)?;

            if hours.is_empty() {
                return Ok(Vec::new());
            }

            let inserted = diesel::insert_into(restaurant_hours::table)
                .values(&hours)
                .returning(RestaurantHours::as_returning())
                .get_results::<RestaurantHours>(conn)?;

            Ok(inserted)
        })
    })
    .await
}

#[tracing::instrument(
    "Getting orders for restaurant",
    skip(pool)
)]
pub async fn list_restaurant_orders(
    pool: &DbPool,
    restaurant_id: i32
) -> Result<Vec<Order>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(orders::table
            .filter(orders::restaurant_id.eq(restaurant_id))
            .order(orders::created_at.desc())
            .select(Order::as_select())
            .load::<Order>(conn)?)
    })
    .await
}
