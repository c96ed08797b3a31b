//! Domain entities and value objects shared by the stores and services.

pub mod alert;
pub mod attendance;
pub mod contract;
pub mod employee;
pub mod movement;
pub mod product;
pub mod token;
pub mod types;
