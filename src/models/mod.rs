//! Diesel row types and their conversions to domain entities.

pub mod alert;
pub mod attendance;
pub mod config;
pub mod contract;
pub mod employee;
pub mod movement;
pub mod product;
pub mod token;
