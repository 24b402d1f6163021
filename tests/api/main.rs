mod admin;
mod auth;
mod deliveries;
mod notifications;
mod orders;
mod staff;
