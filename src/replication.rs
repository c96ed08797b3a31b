//! HTTP client side of the replication bridge.
//!
//! Every failure here is logged by the caller and otherwise ignored; the
//! periodic pull reconciles whatever a push missed.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::dto::sync::{RecentAttendance, SyncAttendancePayload, SyncEmployeePayload};
use crate::models::config::ReplicationConfig;

#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Network failure, timeout or undecodable body.
    #[error("peer request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("peer returned HTTP {0}")]
    HttpStatus(u16),
}

/// Talks to the peer host's sync endpoints.
#[derive(Clone)]
pub struct ReplicationClient {
    client: reqwest::Client,
    peer_url: String,
    retry_backoff: Duration,
}

impl ReplicationClient {
    pub fn new(peer_url: &str, config: &ReplicationConfig) -> Result<Self, ReplicationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            peer_url: peer_url.trim_end_matches('/').to_string(),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    pub fn peer_url(&self) -> &str {
        &self.peer_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.peer_url)
    }

    pub async fn push_attendance(
        &self,
        payload: &SyncAttendancePayload,
    ) -> Result<(), ReplicationError> {
        self.post_json("/sync_asistencia", payload).await
    }

    pub async fn push_employee(&self, payload: &SyncEmployeePayload) -> Result<(), ReplicationError> {
        self.post_json("/sync_empleado", payload).await
    }

    /// Fetches the peer's last week of attendance.
    pub async fn pull_recent(&self) -> Result<RecentAttendance, ReplicationError> {
        let response = self
            .client
            .get(self.url("/sync_recent_asistencias"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ReplicationError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json::<RecentAttendance>().await?)
    }

    /// POSTs `body`, retrying once after the back-off when the peer answers 5xx.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), ReplicationError> {
        match self.try_post(path, body).await {
            Err(ReplicationError::HttpStatus(status)) if (500..600).contains(&status) => {
                log::warn!(
                    "Peer answered {status} to {path}, retrying in {} ms",
                    self.retry_backoff.as_millis()
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.try_post(path, body).await
            }
            other => other,
        }
    }

    async fn try_post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), ReplicationError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        if !response.status().is_success() {
            return Err(ReplicationError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Pushes one freshly written attendance record, and its employee when this
/// request created it. Never fails; outcomes are logged.
pub async fn push_after_write(
    client: ReplicationClient,
    attendance: SyncAttendancePayload,
    employee: Option<SyncEmployeePayload>,
) {
    if let Some(employee) = employee {
        match client.push_employee(&employee).await {
            Ok(()) => log::info!("Pushed employee {} to {}", employee.cedula, client.peer_url()),
            Err(e) => log::warn!("Failed to push employee {}: {e}", employee.cedula),
        }
    }

    match client.push_attendance(&attendance).await {
        Ok(()) => log::info!(
            "Pushed attendance of {} on {} to {}",
            attendance.cedula_empleado,
            attendance.fecha,
            client.peer_url()
        ),
        Err(e) => log::warn!(
            "Failed to push attendance of {} on {}: {e}",
            attendance.cedula_empleado,
            attendance.fecha
        ),
    }
}
