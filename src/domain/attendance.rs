//! Daily attendance records and the `absent → entered → exited` state machine.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::employee::Employee;
use crate::domain::types::{AttendanceId, AttendanceKind, EmployeeId};

/// One employee's attendance for one local calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub employee_id: EmployeeId,
    pub work_date: NaiveDate,
    pub entry_at: Option<NaiveDateTime>,
    pub exit_at: Option<NaiveDateTime>,
    pub last_action: AttendanceKind,
    pub token: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AttendanceRecord {
    pub fn state(&self) -> AttendanceState {
        AttendanceState::of(Some(self))
    }

    /// Decimal hours between entry and exit, when both are set.
    pub fn worked_hours(&self) -> Option<f64> {
        match (self.entry_at, self.exit_at) {
            (Some(entry), Some(exit)) => Some(worked_hours(entry, exit)),
            _ => None,
        }
    }
}

/// Attendance record paired with the employee it belongs to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmployeeAttendance {
    pub employee: Employee,
    pub record: AttendanceRecord,
}

/// Origin of an attendance mark, kept for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestMetadata {
    pub token: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Position of an employee within the daily state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceState {
    Absent,
    Entered,
    Exited,
}

/// Reasons an attendance mark is refused without touching the store.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceRejection {
    #[error("entry already recorded today")]
    AlreadyEntered,
    #[error("exit already recorded today")]
    AlreadyExited,
    #[error("no entry recorded today")]
    NoEntryYet,
}

impl AttendanceState {
    pub fn of(record: Option<&AttendanceRecord>) -> Self {
        match record {
            Some(r) if r.exit_at.is_some() => Self::Exited,
            Some(r) if r.entry_at.is_some() => Self::Entered,
            _ => Self::Absent,
        }
    }

    /// Validates a mark of `kind` from this state and returns the next state.
    ///
    /// Transitions are one-way within a day; revisiting a state is an error.
    pub fn transition(self, kind: AttendanceKind) -> Result<Self, AttendanceRejection> {
        match (self, kind) {
            (Self::Absent, AttendanceKind::Entry) => Ok(Self::Entered),
            (_, AttendanceKind::Entry) => Err(AttendanceRejection::AlreadyEntered),
            (Self::Absent, AttendanceKind::Exit) => Err(AttendanceRejection::NoEntryYet),
            (Self::Entered, AttendanceKind::Exit) => Ok(Self::Exited),
            (Self::Exited, AttendanceKind::Exit) => Err(AttendanceRejection::AlreadyExited),
        }
    }
}

/// Result of a successful attendance mark.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceOutcome {
    pub record: AttendanceRecord,
    pub kind: AttendanceKind,
    pub worked_hours: Option<f64>,
}

/// Hours elapsed between two timestamps as a decimal number.
pub fn worked_hours(entry: NaiveDateTime, exit: NaiveDateTime) -> f64 {
    (exit - entry).num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn state_machine_is_one_way() {
        assert_eq!(
            AttendanceState::Absent.transition(AttendanceKind::Entry),
            Ok(AttendanceState::Entered)
        );
        assert_eq!(
            AttendanceState::Entered.transition(AttendanceKind::Exit),
            Ok(AttendanceState::Exited)
        );
        assert_eq!(
            AttendanceState::Entered.transition(AttendanceKind::Entry),
            Err(AttendanceRejection::AlreadyEntered)
        );
        assert_eq!(
            AttendanceState::Exited.transition(AttendanceKind::Entry),
            Err(AttendanceRejection::AlreadyEntered)
        );
        assert_eq!(
            AttendanceState::Absent.transition(AttendanceKind::Exit),
            Err(AttendanceRejection::NoEntryYet)
        );
        assert_eq!(
            AttendanceState::Exited.transition(AttendanceKind::Exit),
            Err(AttendanceRejection::AlreadyExited)
        );
    }

    #[test]
    fn computes_decimal_worked_hours() {
        let hours = worked_hours(at(8, 2, 10), at(17, 5, 0));
        assert_eq!(format!("{hours:.2}"), "9.05");
    }
}
