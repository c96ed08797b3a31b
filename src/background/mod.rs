//! Long-running loops spawned next to the HTTP server.
//!
//! Each takes a [`tokio_util::sync::CancellationToken`] and returns once it is
//! cancelled. Store work runs on the blocking pool through `web::block`.

pub mod alert_monitor;
pub mod replication_pull;
