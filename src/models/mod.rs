pub mod fridge;
pub mod product;
pub mod recipe;
pub mod user;

pub use fridge::*;
pub use product::*;
pub use recipe::*;
pub use user::*;
