pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod department;
pub mod employee;
pub mod employee_department;
pub mod service_order;
pub mod service_order_department;
pub mod service_order_collaborator;
pub mod service_day;

#[cfg(test)]
mod tests;
