use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::alert::{Alert, AlertHistoryEntry, AlertKey, NewAlert};
use crate::domain::types::{AlertId, AlertKind};
use crate::models::alert::{
    Alert as DbAlert, AlertHistoryEntry as DbAlertHistoryEntry, NewAlert as DbNewAlert,
    NewAlertHistoryEntry,
};
use crate::repository::{
    AlertListQuery, AlertReader, AlertWriter, DieselAlertRepository, RepositoryError,
    RepositoryResult,
};

/// History action recorded when the monitor raises an alert.
pub const ACTION_CREATED: &str = "creada";
/// History action recorded when an operator resolves an alert.
pub const ACTION_RESOLVED: &str = "resuelta";

impl AlertReader for DieselAlertRepository {
    fn get_alert(&self, id: AlertId) -> RepositoryResult<Option<Alert>> {
        use crate::schema::alerts::alerts;

        let mut conn = self.conn()?;

        let alert = alerts::table
            .find(id.get())
            .first::<DbAlert>(&mut conn)
            .optional()?;

        Ok(alert.map(TryInto::try_into).transpose()?)
    }

    fn find_active_alert(&self, key: &AlertKey) -> RepositoryResult<Option<Alert>> {
        use crate::schema::alerts::alerts;

        let mut conn = self.conn()?;

        let alert = alerts::table
            .filter(alerts::active.eq(true))
            .filter(alerts::kind.eq(key.kind.as_str()))
            .filter(alerts::source_catalog.eq(key.source_catalog.as_str()))
            .filter(alerts::source_key.eq(&key.source_key))
            .first::<DbAlert>(&mut conn)
            .optional()?;

        Ok(alert.map(TryInto::try_into).transpose()?)
    }

    fn count_active_alerts(&self, kind: AlertKind) -> RepositoryResult<usize> {
        use crate::schema::alerts::alerts;

        let mut conn = self.conn()?;

        let total = alerts::table
            .filter(alerts::active.eq(true))
            .filter(alerts::kind.eq(kind.as_str()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }

    fn list_alerts(&self, query: AlertListQuery) -> RepositoryResult<Vec<Alert>> {
        use crate::schema::alerts::alerts;

        let mut conn = self.conn()?;

        let mut items = alerts::table.into_boxed::<diesel::sqlite::Sqlite>();

        if query.active_only {
            items = items.filter(alerts::active.eq(true));
        }
        if let Some(kind) = query.kind {
            items = items.filter(alerts::kind.eq(kind.as_str()));
        }
        if let Some(severity) = query.severity {
            items = items.filter(alerts::severity.eq(severity.as_str()));
        }
        if let Some(source) = query.source_catalog {
            items = items.filter(alerts::source_catalog.eq(source.as_str()));
        }
        if let Some(limit) = query.limit {
            items = items.limit(limit as i64);
        }

        let items = items
            .order((alerts::created_at.desc(), alerts::id.desc()))
            .load::<DbAlert>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Alert>, _>>()?;

        Ok(items)
    }

    fn list_alert_history(&self, id: AlertId) -> RepositoryResult<Vec<AlertHistoryEntry>> {
        use crate::schema::alerts::alert_history;

        let mut conn = self.conn()?;

        let items = alert_history::table
            .filter(alert_history::alert_id.eq(id.get()))
            .order(alert_history::id.asc())
            .load::<DbAlertHistoryEntry>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<AlertHistoryEntry>, _>>()?;

        Ok(items)
    }
}

impl AlertWriter for DieselAlertRepository {
    fn create_alert(&self, alert: &NewAlert) -> RepositoryResult<Alert> {
        use crate::schema::alerts::{alert_history, alerts};

        let mut conn = self.conn()?;

        let created = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let row = diesel::insert_into(alerts::table)
                .values(DbNewAlert::from(alert))
                .get_result::<DbAlert>(conn)?;

            diesel::insert_into(alert_history::table)
                .values(NewAlertHistoryEntry {
                    alert_id: row.id,
                    action: ACTION_CREATED,
                    actor: None,
                    notes: None,
                    recorded_at: alert.created_at,
                })
                .execute(conn)?;

            Ok(row)
        })?;

        Ok(created.try_into()?)
    }

    fn resolve_alert(
        &self,
        id: AlertId,
        actor: Option<&str>,
        notes: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<Alert> {
        use crate::schema::alerts::{alert_history, alerts};

        let mut conn = self.conn()?;

        let resolved = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let row = diesel::update(
                alerts::table
                    .find(id.get())
                    .filter(alerts::active.eq(true)),
            )
            .set((alerts::active.eq(false), alerts::resolved_at.eq(Some(now))))
            .get_result::<DbAlert>(conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

            diesel::insert_into(alert_history::table)
                .values(NewAlertHistoryEntry {
                    alert_id: row.id,
                    action: ACTION_RESOLVED,
                    actor,
                    notes,
                    recorded_at: now,
                })
                .execute(conn)?;

            Ok(row)
        })?;

        Ok(resolved.try_into()?)
    }

    fn delete_resolved_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<usize> {
        use crate::schema::alerts::alerts;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            alerts::table
                .filter(alerts::active.eq(false))
                .filter(alerts::resolved_at.lt(cutoff)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }
}
