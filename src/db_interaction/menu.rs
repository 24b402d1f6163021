use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};

use super::{run_blocking, DbError};
use crate::{
    models::{MenuItem, MenuItemChanges, NewMenuItem},
    schema::menu_items,
    utils::DbPool,
};

#[tracing::instrument(
    "Getting menu items for restaurant",
    skip(pool)
)]
pub async fn list_menu_items(
    pool: &DbPool,
    restaurant_id: i32
) -> Result<Vec<MenuItem>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(menu_items::table
            .filter(menu_items::restaurant_id.eq(restaurant_id))
            .order(menu_items::id.asc())
            .select(MenuItem::as_select())
            .load::<MenuItem>(conn)?)
    })
    .await
}

#[tracing::instrument(
    "Inserting menu item",
    skip_all,
    fields(restaurant_id = item.restaurant_id)
)]
pub async fn insert_menu_item(
    pool: &DbPool,
    item: NewMenuItem
) -> Result<MenuItem, DbError> {
    run_blocking(pool, move |conn| {
        Ok(diesel::insert_into(menu_items::table)
            .values(item)
            .returning(MenuItem::as_returning())
            .get_result::<MenuItem>(conn)?)
    })
    .await
}

#[tracing::instrument(
    "Updating menu item",
    skip(pool, changes)
)]
pub async fn update_menu_item(
    pool: &DbPool,
    restaurant_id: i32,
    item_id: i32,
    changes: MenuItemChanges
) -> Result<Option<MenuItem>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(diesel::update(menu_items::table.find(item_id))
            .filter(menu_items::restaurant_id.eq(restaurant_id))
            .set(changes)
            .returning(MenuItem::as_returning())
            .get_result::<MenuItem>(conn)
            .optional()?)
    })
    .await
}

#[tracing::instrument(
    "Deleting menu item",
    skip(pool)
)]
pub async fn delete_menu_item(
    pool: &DbPool,
    restaurant_id: i32,
    item_id: i32
) -> Result<bool, DbError> {
    run_blocking(pool, move |conn| {
        let affected_rows = diesel::delete(menu_items::table.find(item_id))
            .filter(menu_items::restaurant_id.eq(restaurant_id))
            .execute(conn)?;
        Ok(affected_rows > 0)
    })
    .await
}
