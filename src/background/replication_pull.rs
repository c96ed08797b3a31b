use std::time::Duration;

use actix_web::web;
use tokio_util::sync::CancellationToken;

use crate::replication::ReplicationClient;
use crate::repository::DieselPersonnelRepository;
use crate::services::sync::apply_pulled;

/// Pulls the peer's recent attendance every `interval` until cancelled.
pub async fn run(
    client: ReplicationClient,
    repo: DieselPersonnelRepository,
    interval: Duration,
    cancel: CancellationToken,
) {
    log::info!(
        "Replication pull from {} started, interval {}s",
        client.peer_url(),
        interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        let batch = tokio::select! {
            _ = cancel.cancelled() => break,
            pulled = client.pull_recent() => match pulled {
                Ok(batch) => batch,
                Err(e) => {
                    log::warn!("Pull from {} failed: {e}", client.peer_url());
                    continue;
                }
            },
        };

        if batch.asistencias.is_empty() {
            continue;
        }

        let repo = repo.clone();
        let result = web::block(move || {
            let now = chrono::Local::now().naive_local();
            apply_pulled(&repo, &batch, now)
        })
        .await;

        match result {
            Ok(report) => log::info!(
                "Pulled attendance: {} applied, {} skipped",
                report.applied,
                report.failed
            ),
            Err(e) => log::error!("Applying pulled attendance aborted: {e}"),
        }
    }

    log::info!("Replication pull stopped");
}
