//! Account registration, login and token verification.
//!
//! Split the same way as the rest of the service crate: plain domain types,
//! a repository trait with a SeaORM implementation and an in-memory mock,
//! and a framework-independent `AuthService`.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;

pub use service::{AuthConfig, AuthService};
pub use token::Claims;
