//! Pieces shared by every crate of the workspace: logging setup,
//! small response types and pagination parameters.

pub mod types;
pub mod utils;
pub mod pagination;
