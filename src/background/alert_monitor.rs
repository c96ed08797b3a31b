use std::time::Duration;

use actix_web::web;
use tokio_util::sync::CancellationToken;

use crate::models::config::MonitorConfig;
use crate::repository::Repositories;
use crate::services::alerts::run_pass;

/// Runs a monitor pass every `settings.interval_secs` until cancelled.
pub async fn run(repos: Repositories, settings: MonitorConfig, cancel: CancellationToken) {
    let interval = Duration::from_secs(settings.interval_secs);
    log::info!("Alert monitor started, interval {}s", interval.as_secs());

    while !cancel.is_cancelled() {
        let repos = repos.clone();
        let pass_settings = settings.clone();
        let result = web::block(move || {
            let now = chrono::Local::now().naive_local();
            run_pass(
                &repos.personnel,
                &repos.catalogs,
                &repos.alerts,
                &pass_settings,
                now,
            )
        })
        .await;

        match result {
            Ok(report) => log::info!(
                "Alert pass: {} created, {} duplicate, {} capped, {} cleaned, {} failures",
                report.created,
                report.skipped_duplicate,
                report.skipped_cap,
                report.cleaned,
                report.failures
            ),
            Err(e) => log::error!("Alert pass aborted: {e}"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    log::info!("Alert monitor stopped");
}
