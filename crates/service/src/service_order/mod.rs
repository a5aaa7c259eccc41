//! Service orders: the transactional create/update of an order together with
//! its department windows, collaborators and service days.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::ServiceOrderService;
