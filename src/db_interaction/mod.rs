use std::{error::Error, fmt::Debug};

use diesel::{
    result::{DatabaseErrorKind, Error as DieselError},
    PgConnection,
};
use thiserror::Error;

use crate::{telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbPool}};

mod delivery;
mod driver;
mod login;
mod menu;
mod orders;
mod restaurant;
mod staff;

pub use delivery::*;
pub use driver::*;
pub use login::*;
pub use menu::*;
pub use orders::*;
pub use restaurant::*;
pub use staff::*;

#[derive(Error)]
pub enum DbError{
    #[error("Failed to get connection from pool")]
    PoolError(#[from] r2d2::Error),
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    QueryError(#[from] DieselError)
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DbError::QueryError(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            DbError::QueryError(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _))
        )
    }
}

impl Debug for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

/// Checks a connection out of the pool and runs `query` with it on the
/// blocking threadpool.
pub async fn run_blocking<T, E, F>(pool: &DbPool, query: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<DbError> + Send + 'static
{
    let pool = pool.clone();

    spawn_blocking_with_tracing(move || {
        let mut conn = pool.get().map_err(DbError::from)?;
        query(&mut *conn)
    })
    .await
    .map_err(DbError::from)?
}
