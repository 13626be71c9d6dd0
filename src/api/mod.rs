pub mod auth;
pub mod catalog;
pub mod fridge;
pub mod health;
pub mod swagger;
