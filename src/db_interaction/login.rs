use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};

use super::{run_blocking, DbError};
use crate::{
    models::{Login, NewLogin, RestaurantAccount, Staff},
    schema::{logins, restaurant_accounts, staff},
    utils::DbPool,
};

#[tracing::instrument(
    "Getting login by username",
    skip(pool)
)]
pub async fn get_login(
    pool: &DbPool,
    username: String
) -> Result<Option<Login>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(logins::table
            .find(username)
            .select(Login::as_select())
            .first::<Login>(conn)
            .optional()?)
    })
    .await
}

#[tracing::instrument(
    "Inserting login into the database",
    skip_all,
    fields(username = %login.username, usertype = %login.usertype)
)]
pub async fn insert_login(
    pool: &DbPool,
    login: NewLogin
) -> Result<(), DbError> {
    run_blocking(pool, move |conn| {
        diesel::insert_into(logins::table)
            .values(login)
            .execute(conn)?;
        Ok(())
    })
    .await
}

#[tracing::instrument(
    "Updating password hash",
    skip(pool, password_hash)
)]
pub async fn update_password_hash(
    pool: &DbPool,
    username: String,
    password_hash: String
) -> Result<(), DbError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<(), DbError, _>(|conn| {
            diesel::update(logins::table.find(&username))
                .set(logins::password_hash.eq(password_hash))
                .execute(conn)?;

            diesel::update(staff::table.filter(staff::username.eq(&username)))
                .set(staff::first_login.eq(false))
                .execute(conn)?;

            Ok(())
        })
    })
    .await
}

#[tracing::instrument(
    "Getting restaurant account for username",
    skip(pool)
)]
pub async fn get_restaurant_account(
    pool: &DbPool,
    username: String
) -> Result<Option<RestaurantAccount>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(restaurant_accounts::table
            .find(username)
            .select(RestaurantAccount::as_select())
            .first::<RestaurantAccount>(conn)
            .optional()?)
    })
    .await
}

#[tracing::instrument(
    "Linking login to restaurant",
    skip(pool)
)]
pub async fn insert_restaurant_account(
    pool: &DbPool,
    account: RestaurantAccount
) -> Result<(), DbError> {
    run_blocking(pool, move |conn| {
        diesel::insert_into(restaurant_accounts::table)
            .values(account)
            .execute(conn)?;
        Ok(())
    })
    .await
}

#[tracing::instrument(
    "Getting staff member by username",
    skip(pool)
)]
pub async fn get_staff_by_username(
    pool: &DbPool,
    username: String
) -> Result<Option<Staff>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(staff::table
            .filter(staff::username.eq(username))
            .select(Staff::as_select())
            .first::<Staff>(conn)
            .optional()?)
    })
    .await
}
