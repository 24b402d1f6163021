mod admin;
mod auth;
mod deliveries;
mod drivers;
mod health_check;
mod notifications;
mod orders;
mod restaurants;
mod staff;

pub use admin::*;
pub use auth::*;
pub use deliveries::*;
pub use drivers::*;
pub use health_check::*;
pub use notifications::*;
pub use orders::*;
pub use restaurants::*;
pub use staff::*;
