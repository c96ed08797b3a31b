use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::alert::{
    Alert as DomainAlert, AlertHistoryEntry as DomainAlertHistoryEntry,
};
use crate::domain::types::{AlertKind, Severity, StoreKind, TypeConstraintError};

/// Diesel model representing the `alerts` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::alerts::alerts)]
pub struct Alert {
    pub id: i32,
    pub kind: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub source_catalog: String,
    pub source_key: String,
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub active: bool,
    pub payload: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::alerts::alerts)]
pub struct NewAlert<'a> {
    pub kind: &'a str,
    pub severity: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub source_catalog: &'a str,
    pub source_key: &'a str,
    pub created_at: NaiveDateTime,
    pub active: bool,
    pub payload: String,
}

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::alerts::alert_history)]
pub struct AlertHistoryEntry {
    pub id: i32,
    pub alert_id: i32,
    pub action: String,
    pub actor: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::alerts::alert_history)]
pub struct NewAlertHistoryEntry<'a> {
    pub alert_id: i32,
    pub action: &'a str,
    pub actor: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub recorded_at: NaiveDateTime,
}

impl TryFrom<Alert> for DomainAlert {
    type Error = TypeConstraintError;

    fn try_from(alert: Alert) -> Result<Self, Self::Error> {
        let payload = serde_json::from_str(&alert.payload)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("alert payload: {e}")))?;
        Ok(Self {
            id: alert.id.try_into()?,
            kind: AlertKind::try_from(alert.kind)?,
            severity: Severity::try_from(alert.severity)?,
            title: alert.title,
            message: alert.message,
            source_catalog: StoreKind::try_from(alert.source_catalog)?,
            source_key: alert.source_key,
            created_at: alert.created_at,
            resolved_at: alert.resolved_at,
            active: alert.active,
            payload,
        })
    }
}

impl<'a> From<&'a crate::domain::alert::NewAlert> for NewAlert<'a> {
    fn from(alert: &'a crate::domain::alert::NewAlert) -> Self {
        Self {
            kind: alert.kind.as_str(),
            severity: alert.severity.as_str(),
            title: &alert.title,
            message: &alert.message,
            source_catalog: alert.source_catalog.as_str(),
            source_key: &alert.source_key,
            created_at: alert.created_at,
            active: true,
            payload: alert.payload.to_string(),
        }
    }
}

impl TryFrom<AlertHistoryEntry> for DomainAlertHistoryEntry {
    type Error = TypeConstraintError;

    fn try_from(entry: AlertHistoryEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entry.id,
            alert_id: entry.alert_id.try_into()?,
            action: entry.action,
            actor: entry.actor,
            notes: entry.notes,
            recorded_at: entry.recorded_at,
        })
    }
}
