//! The alert monitor: one pass over every store, plus the operator-facing
//! alert operations.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::json;

use crate::domain::alert::{Alert, AlertHistoryEntry, AlertSummary, NewAlert};
use crate::domain::contract::ExpiringContract;
use crate::domain::product::Product;
use crate::domain::types::{AlertId, AlertKind, Catalog, Severity, StoreKind};
use crate::models::config::MonitorConfig;
use crate::repository::{
    AlertListQuery, AlertReader, AlertWriter, ContractReader, ProductListQuery, ProductReader,
    RepositoryError, StoreHealth,
};

use super::{ServiceError, ServiceResult};

/// Counters describing what one monitor pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub created: usize,
    pub skipped_duplicate: usize,
    pub skipped_cap: usize,
    pub cleaned: usize,
    pub failures: usize,
}

/// Low and critical thresholds derived from a product's minimum stock.
pub fn stock_thresholds(min_stock: i32, critical_ratio: f64) -> (i32, i32) {
    let critical = (f64::from(min_stock) * critical_ratio).floor() as i32;
    (min_stock, critical.clamp(0, min_stock))
}

/// Stock alert for `product`, if its balance is at or under its thresholds.
pub fn stock_candidate(
    product: &Product,
    critical_ratio: f64,
    now: NaiveDateTime,
) -> Option<NewAlert> {
    let min_stock = product.min_stock.get();
    if min_stock == 0 || !product.active {
        return None;
    }
    let balance = product.balance.get();
    let (low, critical) = stock_thresholds(min_stock, critical_ratio);

    let (kind, severity, title) = if balance <= critical {
        (
            AlertKind::CriticalStock,
            Severity::High,
            format!("Stock crítico: {}", product.name),
        )
    } else if balance <= low {
        (
            AlertKind::LowStock,
            Severity::Medium,
            format!("Stock bajo: {}", product.name),
        )
    } else {
        return None;
    };

    Some(NewAlert {
        kind,
        severity,
        title,
        message: format!(
            "{} ({}) tiene {} {} en {}; mínimo {}",
            product.name, product.code, balance, product.unit, product.catalog, min_stock
        ),
        source_catalog: product.catalog.into(),
        source_key: product.code.to_string(),
        payload: json!({
            "codigo": product.code.as_str(),
            "saldo": balance,
            "stock_minimo": min_stock,
            "umbral_critico": critical,
        }),
        created_at: now,
    })
}

/// Expiry alert for a chemical expiring within the window.
pub fn expiry_candidate(product: &Product, today: NaiveDate, now: NaiveDateTime) -> Option<NewAlert> {
    let expires = product.details.expiration_date()?;
    let days = (expires - today).num_days();
    if days <= 0 {
        return None;
    }

    Some(NewAlert {
        kind: AlertKind::Expiring,
        severity: Severity::for_expiry(days),
        title: format!("Vencimiento próximo: {}", product.name),
        message: format!(
            "{} ({}) vence el {expires} ({days} días); saldo {} {}",
            product.name, product.code, product.balance, product.unit
        ),
        source_catalog: product.catalog.into(),
        source_key: product.code.to_string(),
        payload: json!({
            "codigo": product.code.as_str(),
            "fecha_vencimiento": expires,
            "dias_restantes": days,
            "saldo": product.balance.get(),
        }),
        created_at: now,
    })
}

/// Contract-expiry alert for an employee's active contract.
pub fn contract_candidate(
    expiring: &ExpiringContract,
    today: NaiveDate,
    now: NaiveDateTime,
) -> Option<NewAlert> {
    let end = expiring.contract.end_date?;
    let days = (end - today).num_days();
    if days < 0 {
        return None;
    }

    Some(NewAlert {
        kind: AlertKind::ContractExpiring,
        severity: Severity::for_contract(days),
        title: format!("Contrato por vencer: {}", expiring.full_name),
        message: format!(
            "El contrato {} de {} ({}) termina el {end} ({days} días)",
            expiring.contract.contract_type, expiring.full_name, expiring.national_id
        ),
        source_catalog: StoreKind::Personnel,
        source_key: expiring.national_id.to_string(),
        payload: json!({
            "cedula": expiring.national_id.as_str(),
            "contrato_id": expiring.contract.id.get(),
            "fecha_fin": end,
            "dias_restantes": days,
        }),
        created_at: now,
    })
}

/// High-severity alert for a store that failed its reachability probe.
pub fn system_candidate(store: StoreKind, error: &str, now: NaiveDateTime) -> NewAlert {
    NewAlert {
        kind: AlertKind::SystemError,
        severity: Severity::High,
        title: format!("Base de datos {store} inaccesible"),
        message: format!("No se pudo acceder a {}: {error}", store.file_name()),
        source_catalog: store,
        source_key: store.to_string(),
        payload: json!({ "archivo": store.file_name(), "error": error }),
        created_at: now,
    }
}

/// Persists `candidate` unless an active alert already covers it or its kind
/// has reached the cap.
fn offer<A>(alerts: &A, candidate: NewAlert, cap: usize, report: &mut PassReport)
where
    A: AlertReader + AlertWriter,
{
    match alerts.find_active_alert(&candidate.key()) {
        Ok(Some(_)) => {
            report.skipped_duplicate += 1;
            return;
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to look up active alert: {e}");
            report.failures += 1;
            return;
        }
    }

    match alerts.count_active_alerts(candidate.kind) {
        Ok(active) if active >= cap => {
            report.skipped_cap += 1;
            return;
        }
        Ok(_) => {}
        Err(e) => {
            log::error!("Failed to count active {} alerts: {e}", candidate.kind);
            report.failures += 1;
            return;
        }
    }

    match alerts.create_alert(&candidate) {
        Ok(alert) => {
            log::info!(
                "Alert {} created: {} [{}] {}",
                alert.id,
                alert.kind,
                alert.severity,
                alert.source_key
            );
            report.created += 1;
        }
        // Another writer raised the same alert since the lookup.
        Err(RepositoryError::ConstraintViolation(_)) => report.skipped_duplicate += 1,
        Err(e) => {
            log::error!("Failed to create alert: {e}");
            report.failures += 1;
        }
    }
}

fn scan_catalog<C, A>(
    catalog: &C,
    alerts: &A,
    settings: &MonitorConfig,
    now: NaiveDateTime,
    report: &mut PassReport,
) where
    C: ProductReader,
    A: AlertReader + AlertWriter,
{
    let cap = settings.max_active_per_kind;

    match catalog.list_products(ProductListQuery::default().active().with_min_stock()) {
        Ok((_, products)) => {
            for product in &products {
                if let Some(candidate) =
                    stock_candidate(product, settings.critical_stock_ratio, now)
                {
                    offer(alerts, candidate, cap, report);
                }
            }
        }
        Err(e) => {
            log::error!("Stock scan of {} failed: {e}", catalog.catalog());
            report.failures += 1;
        }
    }

    if catalog.catalog() != Catalog::Chemicals {
        return;
    }

    let today = now.date();
    let until = today + Duration::days(settings.expiry_window_days);
    match catalog.list_expiring_products(today, until) {
        Ok(products) => {
            for product in &products {
                if let Some(candidate) = expiry_candidate(product, today, now) {
                    offer(alerts, candidate, cap, report);
                }
            }
        }
        Err(e) => {
            log::error!("Expiry scan of {} failed: {e}", catalog.catalog());
            report.failures += 1;
        }
    }
}

/// Runs one monitor pass at `now`.
///
/// Failures are counted and logged; the pass always runs to completion.
pub fn run_pass<P, C, A>(
    personnel: &P,
    catalogs: &[C],
    alerts: &A,
    settings: &MonitorConfig,
    now: NaiveDateTime,
) -> PassReport
where
    P: ContractReader + StoreHealth,
    C: ProductReader + StoreHealth,
    A: AlertReader + AlertWriter + StoreHealth,
{
    let mut report = PassReport::default();
    let cap = settings.max_active_per_kind;

    if let Err(e) = alerts.ping() {
        log::error!("Alert store unreachable, skipping pass: {e}");
        report.failures += 1;
        return report;
    }

    for catalog in catalogs {
        scan_catalog(catalog, alerts, settings, now, &mut report);
    }

    let today = now.date();
    let until = today + Duration::days(settings.contract_window_days);
    match personnel.list_expiring_contracts(today, until) {
        Ok(contracts) => {
            for contract in &contracts {
                if let Some(candidate) = contract_candidate(contract, today, now) {
                    offer(alerts, candidate, cap, &mut report);
                }
            }
        }
        Err(e) => {
            log::error!("Contract scan failed: {e}");
            report.failures += 1;
        }
    }

    let stores = std::iter::once(personnel as &dyn StoreHealth)
        .chain(catalogs.iter().map(|c| c as &dyn StoreHealth));
    for store in stores {
        if let Err(e) = store.ping() {
            log::error!("Store {} unreachable: {e}", store.store());
            offer(
                alerts,
                system_candidate(store.store(), &e.to_string(), now),
                cap,
                &mut report,
            );
        }
    }

    let cutoff = now - Duration::days(settings.retention_days);
    match alerts.delete_resolved_before(cutoff) {
        Ok(cleaned) => {
            if cleaned > 0 {
                log::info!("Cleaned {cleaned} resolved alerts older than {cutoff}");
            }
            report.cleaned = cleaned;
        }
        Err(e) => {
            log::error!("Alert cleanup failed: {e}");
            report.failures += 1;
        }
    }

    report
}

pub fn list_active_alerts<A>(alerts: &A, query: AlertListQuery) -> ServiceResult<Vec<Alert>>
where
    A: AlertReader,
{
    alerts.list_alerts(query).map_err(|e| {
        log::error!("Failed to list alerts: {e}");
        e.into()
    })
}

/// Counts of active alerts by severity and kind.
pub fn alert_summary<A>(alerts: &A) -> ServiceResult<AlertSummary>
where
    A: AlertReader,
{
    let active = list_active_alerts(alerts, AlertListQuery::default().active())?;
    Ok(AlertSummary::from_alerts(&active))
}

/// Marks an active alert resolved and records who did it.
pub fn resolve_alert<A>(
    alerts: &A,
    id: AlertId,
    actor: Option<&str>,
    notes: Option<&str>,
    now: NaiveDateTime,
) -> ServiceResult<Alert>
where
    A: AlertWriter,
{
    let actor = actor.map(str::trim).filter(|a| !a.is_empty());
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());
    match alerts.resolve_alert(id, actor, notes, now) {
        Ok(alert) => {
            log::info!("Alert {id} resolved by {}", actor.unwrap_or("-"));
            Ok(alert)
        }
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to resolve alert {id}: {e}");
            Err(e.into())
        }
    }
}

pub fn alert_history<A>(alerts: &A, id: AlertId) -> ServiceResult<Vec<AlertHistoryEntry>>
where
    A: AlertReader,
{
    match alerts.get_alert(id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get alert {id}: {e}");
            return Err(e.into());
        }
    }
    alerts.list_alert_history(id).map_err(|e| {
        log::error!("Failed to list history of alert {id}: {e}");
        e.into()
    })
}
