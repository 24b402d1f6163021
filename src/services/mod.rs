pub mod admin;
pub mod auth;
pub mod driver;
pub mod email;
pub mod order;
pub mod restaurant;
pub mod staff;
