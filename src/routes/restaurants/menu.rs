use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    response,
    services::restaurant::{self, MenuItemInput, MenuItemUpdate, RestaurantError},
    utils::DbPool,
};

#[tracing::instrument(
    "Getting menu",
    skip(pool)
)]
pub async fn get_menu(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, RestaurantError> {
    let items = restaurant::menu(&pool, path.into_inner()).await?;
    Ok(response::ok(json!({ "menu": items })))
}

#[tracing::instrument(
    "Posting menu item",
    skip(pool, form)
)]
pub async fn post_menu_item(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    form: web::Json<MenuItemInput>
) -> Result<HttpResponse, RestaurantError> {
    let item = restaurant::add_menu_item(&pool, path.into_inner(), form.into_inner()).await?;
    Ok(response::created(json!({ "item": item })))
}

#[tracing::instrument(
    "Updating menu item",
    skip(pool, form)
)]
pub async fn update_menu_item(
    pool: web::Data<DbPool>,
    path: web::Path<(i32, i32)>,
    form: web::Json<MenuItemUpdate>
) -> Result<HttpResponse, RestaurantError> {
    let (restaurant_id, item_id) = path.into_inner();
    let item = restaurant::change_menu_item(&pool, restaurant_id, item_id, form.into_inner()).await?;
    Ok(response::ok(json!({ "item": item })))
}

#[tracing::instrument(
    "Deleting menu item",
    skip(pool)
)]
pub async fn delete_menu_item(
    pool: web::Data<DbPool>,
    path: web::Path<(i32, i32)>
) -> Result<HttpResponse, RestaurantError> {
    let (restaurant_id, item_id) = path.into_inner();
    restaurant::remove_menu_item(&pool, restaurant_id, item_id).await?;
    Ok(response::ok(json!({ "message": "Menu item deleted" })))
}
