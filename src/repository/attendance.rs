use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::attendance::{
    AttendanceOutcome, AttendanceRecord, AttendanceState, EmployeeAttendance, RequestMetadata,
};
use crate::domain::employee::Employee;
use crate::domain::types::{AttendanceKind, EmployeeId};
use crate::models::attendance::{
    AttendanceRecord as DbAttendanceRecord, NewAttendanceRecord as DbNewAttendanceRecord,
};
use crate::models::employee::Employee as DbEmployee;
use crate::repository::{
    AttendanceListQuery, AttendanceMerge, AttendanceReader, AttendanceWriter,
    DieselPersonnelRepository, RepositoryError, RepositoryResult,
};

fn load_day(
    conn: &mut SqliteConnection,
    employee_id: EmployeeId,
    date: NaiveDate,
) -> QueryResult<Option<DbAttendanceRecord>> {
    use crate::schema::personnel::attendance;

    attendance::table
        .filter(attendance::employee_id.eq(employee_id.get()))
        .filter(attendance::work_date.eq(date))
        .first::<DbAttendanceRecord>(conn)
        .optional()
}

impl AttendanceReader for DieselPersonnelRepository {
    fn get_attendance(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>> {
        let mut conn = self.conn()?;

        let record = load_day(&mut conn, employee_id, date)?;

        Ok(record.map(TryInto::try_into).transpose()?)
    }

    fn list_attendance(
        &self,
        query: AttendanceListQuery,
    ) -> RepositoryResult<Vec<EmployeeAttendance>> {
        use crate::schema::personnel::{attendance, employees};

        let mut conn = self.conn()?;

        let mut items = attendance::table
            .inner_join(employees::table)
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(national_id) = &query.national_id {
            items = items.filter(employees::national_id.eq(national_id.as_str().to_string()));
        }
        if let Some(from) = query.from {
            items = items.filter(attendance::work_date.ge(from));
        }
        if let Some(to) = query.to {
            items = items.filter(attendance::work_date.le(to));
        }

        let rows = items
            .order((attendance::work_date.desc(), attendance::id.desc()))
            .load::<(DbAttendanceRecord, DbEmployee)>(&mut conn)?;

        rows.into_iter()
            .map(|(record, employee)| {
                Ok(EmployeeAttendance {
                    employee: Employee::try_from(employee)?,
                    record: AttendanceRecord::try_from(record)?,
                })
            })
            .collect()
    }
}

impl AttendanceWriter for DieselPersonnelRepository {
    fn record_attendance(
        &self,
        employee_id: EmployeeId,
        kind: AttendanceKind,
        now: NaiveDateTime,
        metadata: &RequestMetadata,
    ) -> RepositoryResult<AttendanceOutcome> {
        use crate::schema::personnel::attendance;

        let mut conn = self.conn()?;
        let work_date = now.date();

        let stored = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let existing = load_day(conn, employee_id, work_date)?;
            let current: Option<AttendanceRecord> =
                existing.clone().map(TryInto::try_into).transpose()?;
            AttendanceState::of(current.as_ref()).transition(kind)?;

            let metadata_columns = (
                attendance::last_action.eq(kind.as_str()),
                attendance::token.eq(metadata.token.as_deref()),
                attendance::ip_address.eq(metadata.ip_address.as_deref()),
                attendance::user_agent.eq(metadata.user_agent.as_deref()),
                attendance::updated_at.eq(now),
            );

            let row = match (existing, kind) {
                (None, _) => diesel::insert_into(attendance::table)
                    .values(DbNewAttendanceRecord {
                        employee_id: employee_id.get(),
                        work_date,
                        entry_at: Some(now),
                        exit_at: None,
                        last_action: kind.as_str(),
                        token: metadata.token.as_deref(),
                        ip_address: metadata.ip_address.as_deref(),
                        user_agent: metadata.user_agent.as_deref(),
                        updated_at: now,
                    })
                    .get_result::<DbAttendanceRecord>(conn)?,
                (Some(row), AttendanceKind::Entry) => diesel::update(attendance::table.find(row.id))
                    .set((attendance::entry_at.eq(Some(now)), metadata_columns))
                    .get_result::<DbAttendanceRecord>(conn)?,
                (Some(row), AttendanceKind::Exit) => diesel::update(attendance::table.find(row.id))
                    .set((attendance::exit_at.eq(Some(now)), metadata_columns))
                    .get_result::<DbAttendanceRecord>(conn)?,
            };

            Ok(row)
        })?;

        let record: AttendanceRecord = stored.try_into()?;
        let worked_hours = match kind {
            AttendanceKind::Entry => None,
            AttendanceKind::Exit => record.worked_hours(),
        };

        Ok(AttendanceOutcome {
            record,
            kind,
            worked_hours,
        })
    }

    fn merge_attendance(
        &self,
        employee_id: EmployeeId,
        merge: &AttendanceMerge,
    ) -> RepositoryResult<AttendanceRecord> {
        use crate::schema::personnel::attendance;

        let mut conn = self.conn()?;

        let stored = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let existing = load_day(conn, employee_id, merge.work_date)?;

            let entry_at = existing
                .as_ref()
                .and_then(|row| row.entry_at)
                .or(merge.entry_at);
            let exit_at = existing
                .as_ref()
                .and_then(|row| row.exit_at)
                .or(merge.exit_at)
                .filter(|exit| {
                    let valid = entry_at.is_some_and(|entry| *exit > entry);
                    if !valid {
                        log::warn!(
                            "Dropping exit {exit} for employee {} on {}: not after entry",
                            employee_id,
                            merge.work_date
                        );
                    }
                    valid
                });
            let last_action = if exit_at.is_some() {
                AttendanceKind::Exit
            } else {
                AttendanceKind::Entry
            };

            let row = match existing {
                Some(row) => {
                    if row.entry_at == entry_at && row.exit_at == exit_at {
                        return Ok(row);
                    }
                    diesel::update(attendance::table.find(row.id))
                        .set((
                            attendance::entry_at.eq(entry_at),
                            attendance::exit_at.eq(exit_at),
                            attendance::last_action.eq(last_action.as_str()),
                            attendance::updated_at.eq(merge.updated_at),
                        ))
                        .get_result::<DbAttendanceRecord>(conn)?
                }
                None => {
                    if entry_at.is_none() {
                        return Err(RepositoryError::ValidationError(
                            "attendance without entry timestamp".to_string(),
                        ));
                    }
                    diesel::insert_into(attendance::table)
                        .values(DbNewAttendanceRecord {
                            employee_id: employee_id.get(),
                            work_date: merge.work_date,
                            entry_at,
                            exit_at,
                            last_action: last_action.as_str(),
                            token: merge.metadata.token.as_deref(),
                            ip_address: merge.metadata.ip_address.as_deref(),
                            user_agent: merge.metadata.user_agent.as_deref(),
                            updated_at: merge.updated_at,
                        })
                        .get_result::<DbAttendanceRecord>(conn)?
                }
            };

            Ok(row)
        })?;

        Ok(stored.try_into()?)
    }
}
