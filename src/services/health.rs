use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::StoreKind;
use crate::repository::{EmployeeReader, StoreHealth};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreStatus {
    pub store: StoreKind,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `/health`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthReport {
    /// `ok` when every store answers, `degraded` otherwise.
    pub status: &'static str,
    pub stores: Vec<StoreStatus>,
    /// Registered employees, active or not; absent when the personnel store is down.
    pub empleados: Option<usize>,
    pub timestamp: NaiveDateTime,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.stores.iter().all(|s| s.reachable)
    }
}

/// Probes every store and counts registered employees.
pub fn health_report<P>(
    personnel: &P,
    others: &[&dyn StoreHealth],
    now: NaiveDateTime,
) -> HealthReport
where
    P: EmployeeReader + StoreHealth,
{
    let stores: Vec<StoreStatus> = std::iter::once(personnel as &dyn StoreHealth)
        .chain(others.iter().copied())
        .map(|store| match store.ping() {
            Ok(()) => StoreStatus {
                store: store.store(),
                reachable: true,
                error: None,
            },
            Err(e) => {
                log::error!("Health check of {} failed: {e}", store.store());
                StoreStatus {
                    store: store.store(),
                    reachable: false,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let empleados = match personnel.count_employees(false) {
        Ok(count) => Some(count),
        Err(e) => {
            log::error!("Failed to count employees: {e}");
            None
        }
    };

    let status = if stores.iter().all(|s| s.reachable) {
        "ok"
    } else {
        "degraded"
    };

    HealthReport {
        status,
        stores,
        empleados,
        timestamp: now,
    }
}
