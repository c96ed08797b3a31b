pub mod alerts;
pub mod attendance;
pub mod errors;
pub mod health;
pub mod ledger;
pub mod personnel;
pub mod sync;
pub mod tokens;

pub use errors::{ServiceError, ServiceResult};
