mod get;
mod hours;
mod menu;
mod register;
mod withdraw;

pub use get::*;
pub use hours::*;
pub use menu::*;
pub use register::*;
pub use withdraw::*;
