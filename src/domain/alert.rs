use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AlertId, AlertKind, Severity, StoreKind};

/// A monitor finding shown to operators until resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub source_catalog: StoreKind,
    /// Product code or employee national ID.
    pub source_key: String,
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub active: bool,
    pub payload: serde_json::Value,
}

/// Natural key under which at most one alert may be active.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub kind: AlertKind,
    pub source_catalog: StoreKind,
    pub source_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub source_catalog: StoreKind,
    pub source_key: String,
    pub payload: serde_json::Value,
    pub created_at: NaiveDateTime,
}

impl NewAlert {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            kind: self.kind,
            source_catalog: self.source_catalog,
            source_key: self.source_key.clone(),
        }
    }
}

impl Alert {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            kind: self.kind,
            source_catalog: self.source_catalog,
            source_key: self.source_key.clone(),
        }
    }
}

/// Audit trail row written when an alert changes state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertHistoryEntry {
    pub id: i32,
    pub alert_id: AlertId,
    pub action: String,
    pub actor: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: NaiveDateTime,
}

/// Active alert counts grouped for dashboards.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AlertSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_kind: Vec<(AlertKind, usize)>,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        use crate::domain::types::Severity as S;
        let count = |severity: S| alerts.iter().filter(|a| a.severity == severity).count();
        let by_kind = AlertKind::ALL
            .iter()
            .map(|kind| (*kind, alerts.iter().filter(|a| a.kind == *kind).count()))
            .filter(|(_, n)| *n > 0)
            .collect();
        Self {
            total: alerts.len(),
            high: count(S::High),
            medium: count(S::Medium),
            low: count(S::Low),
            by_kind,
        }
    }
}
