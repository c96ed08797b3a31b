pub mod alerts;
pub mod attendance;
pub mod inventory;
