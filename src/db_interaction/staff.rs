use std::{collections::HashSet, error::Error, fmt::Debug};

use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper, TextExpressionMethods};
use thiserror::Error;

use super::{run_blocking, DbError};
use crate::{
    domain::{staff_username_candidates, UserType},
    models::{NewLogin, NewStaff, Staff},
    schema::{logins, staff},
    utils::{error_fmt_chain, DbPool},
};

pub struct StaffRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub password_hash: String,
}

#[derive(Error)]
pub enum InsertStaffError{
    #[error("No free username left for last name {0}")]
    NoFreeUsername(String),
    #[error(transparent)]
    DbError(#[from] DbError)
}

impl From<diesel::result::Error> for InsertStaffError {
    fn from(e: diesel::result::Error) -> Self {
        InsertStaffError::DbError(e.into())
    }
}

impl Debug for InsertStaffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Listing staff",
    skip(pool)
)]
pub async fn list_staff(pool: &DbPool) -> Result<Vec<Staff>, DbError> {
    run_blocking(pool, move |conn| {
        Ok(staff::table
            .order(staff::id.asc())
            .select(Staff::as_select())
            .load::<Staff>(conn)?)
    })
    .await
}

/// Picks the first free username, then creates the staff login and the
/// staff row together.
#[tracing::instrument(
    "Inserting staff member with login",
    skip_all,
    fields(last_name = %record.last_name)
)]
pub async fn insert_staff_with_login(
    pool: &DbPool,
    record: StaffRecord
) -> Result<Staff, InsertStaffError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<Staff, InsertStaffError, _>(|conn| {
            let mut candidates = staff_username_candidates(&record.last_name).peekable();
            let prefix = match candidates.peek() {
                Some(first) => first[..first.len() - 2].to_string(),
                None => return Err(InsertStaffError::NoFreeUsername(record.last_name.clone()))
            };

            let taken: HashSet<String> = logins::table
                .filter(logins::username.like(format!("{}%", prefix)))
                .select(logins::username)
                .load::<String>(conn)?
                .into_iter()
                .collect();

            let username = candidates
                .find(|candidate| !taken.contains(candidate))
                .ok_or_else(|| InsertStaffError::NoFreeUsername(record.last_name.clone()))?;

            diesel::insert_into(logins::table)
                .values(NewLogin {
                    username: username.clone(),
                    password_hash: record.password_hash,
                    usertype: UserType::Staff,
                })
                .execute(conn)?;

            let member = diesel::insert_into(staff::table)
                .values(NewStaff {
                    first_name: record.first_name,
                    last_name: record.last_name,
                    username,
                    email: record.email,
                    first_login: true,
                })
                .returning(Staff::as_returning())
                .get_result::<Staff>(conn)?;

            Ok(member)
        })
    })
    .await
}

// Deleting the login cascades to the staff row
#[tracing::instrument(
    "Deleting staff member and login",
    skip(pool)
)]
pub async fn delete_staff(
    pool: &DbPool,
    staff_id: i32
) -> Result<Option<Staff>, DbError> {
    run_blocking(pool, move |conn| {
        conn.transaction::<Option<Staff>, DbError, _>(|conn| {
            let member = match staff::table
                .find(staff_id)
                .select(Staff::as_select())
                .first::<Staff>(conn)
                .optional()?
            {
                Some(m) => m,
                None => return Ok(None)
            };

            diesel::delete(logins::table.find(&member.username))
                .execute(conn)?;

            Ok(Some(member))
        })
    })
    .await
}
