use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::attendance::AttendanceRecord as DomainAttendanceRecord;
use crate::domain::types::{AttendanceKind, TypeConstraintError};

/// Diesel model representing the `attendance` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::personnel::attendance)]
pub struct AttendanceRecord {
    pub id: i32,
    pub employee_id: i32,
    pub work_date: NaiveDate,
    pub entry_at: Option<NaiveDateTime>,
    pub exit_at: Option<NaiveDateTime>,
    pub last_action: String,
    pub token: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::personnel::attendance)]
pub struct NewAttendanceRecord<'a> {
    pub employee_id: i32,
    pub work_date: NaiveDate,
    pub entry_at: Option<NaiveDateTime>,
    pub exit_at: Option<NaiveDateTime>,
    pub last_action: &'a str,
    pub token: Option<&'a str>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AttendanceRecord> for DomainAttendanceRecord {
    type Error = TypeConstraintError;

    fn try_from(record: AttendanceRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id.try_into()?,
            employee_id: record.employee_id.try_into()?,
            work_date: record.work_date,
            entry_at: record.entry_at,
            exit_at: record.exit_at,
            last_action: AttendanceKind::try_from(record.last_action)?,
            token: record.token,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
        })
    }
}
