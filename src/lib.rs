//! Core library of the field attendance service.
//!
//! The `data` feature exposes the stores: domain types, Diesel models and
//! repositories. The `server` feature adds the services, HTTP routes,
//! replication bridge and background workers used by the binary.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod background;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod qr;
#[cfg(feature = "server")]
pub mod replication;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
