// Stores an enum in a `Text` column through its `as_str` / `FromStr` pair.
macro_rules! text_column_enum {
    ($ty:ty) => {
        impl diesel::serialize::ToSql<diesel::sql_types::Text, diesel::pg::Pg> for $ty {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                use std::io::Write;
                out.write_all(self.as_str().as_bytes())?;
                Ok(diesel::serialize::IsNull::No)
            }
        }

        impl diesel::deserialize::FromSql<diesel::sql_types::Text, diesel::pg::Pg> for $ty {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                let raw = std::str::from_utf8(bytes.as_bytes())?;
                Ok(raw.parse::<$ty>()?)
            }
        }
    };
}

mod order_status;
mod restaurant_state;
mod staff_username;
mod user_email;
mod usertype;

pub use order_status::{DeliveryStatus, OrderStatus, QueueStatus};
pub use restaurant_state::{RequestStatus, RestaurantState, Transition, TransitionError};
pub use staff_username::staff_username_candidates;
pub use user_email::UserEmail;
pub use usertype::UserType;

#[derive(Debug, thiserror::Error)]
#[error("unrecognized {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
