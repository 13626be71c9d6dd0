pub mod auth_service;
pub mod availability_service;
pub mod catalog_service;
pub mod credential_service;
pub mod fridge_service;

pub use credential_service::{CredentialError, CredentialService, SessionClaims};
