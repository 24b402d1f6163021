use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};

use super::{run_blocking, DbError};
use crate::{
    models::{Driver, NewDriver},
    schema::drivers,
    utils::DbPool,
};

#[tracing::instrument(
    "Listing drivers",
    skip(pool)
)]
pub async fn list_drivers(
    pool: &DbPool,
    only_active: bool
) -> Result<Vec<Driver>, DbError> {
    run_blocking(pool, move |conn| {
        let mut query = drivers::table
            .select(Driver::as_select())
            .order(drivers::id.asc())
            .into_boxed();

        if only_active {
            query = query.filter(drivers::is_active.eq(true));
        }

        Ok(query.load::<Driver>(conn)?)
    })
    .await
}

#[tracing::instrument(
    "Inserting driver",
    skip_all,
    fields(name = %driver.name)
)]
pub async fn insert_driver(
    pool: &DbPool,
    driver: NewDriver
) -> Result<Driver, DbError> {
    run_blocking(pool, move |conn| {
        Ok(diesel::insert_into(drivers::table)
            .values(driver)
            .returning(Driver::as_returning())
            .get_result::<Driver>(conn)?)
    })
    .await
}

#[tracing::instrument(
    "Setting driver active flag",
    skip(pool)
)]
pub async fn set_driver_active(
    pool: &DbPool,
    driver_id: i32,
    is_active: bool
) -> Result<Option<Driver>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(diesel::update(drivers::table.find(driver_id))
            .set(drivers::is_active.eq(is_active))
            .returning(Driver::as_returning())
            .get_result::<Driver>(conn)
            .optional()?)
    })
    .await
}

// Fails with a foreign key violation while the driver has deliveries
#[tracing::instrument(
    "Deleting driver",
    skip(pool)
)]
pub async fn delete_driver(
    pool: &DbPool,
    driver_id: i32
) -> Result<bool, DbError> {
    run_blocking(pool, move |conn| {
        let affected_rows = diesel::delete(drivers::table.find(driver_id))
            .execute(conn)?;
        Ok(affected_rows > 0)
    })
    .await
}
