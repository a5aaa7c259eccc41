//! Business services on top of the `models` crate.
//!
//! - `auth`: registration, login and JWT verification.
//! - `db`: department and employee workflows as free functions over a connection.
//! - `service_order`: the transactional service-order workflow behind a repository trait.

pub mod errors;
pub mod auth;
pub mod db;
pub mod service_order;
#[cfg(test)]
pub mod test_support;
