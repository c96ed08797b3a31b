//! The attendance engine: token check, first-sighting registration and the
//! daily entry/exit transition.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::attendance::{AttendanceOutcome, EmployeeAttendance, RequestMetadata};
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::types::{AttendanceKind, FullName, NationalId};
use crate::forms::attendance::RegisterAttendancePayload;
use crate::repository::{
    AttendanceListQuery, AttendanceReader, AttendanceWriter, EmployeeReader, EmployeeWriter,
    RepositoryError, TokenReader,
};
use crate::services::tokens::validate_token;

use super::{ServiceError, ServiceResult};

/// Result of a successful mark, ready to be shown and replicated.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceReceipt {
    pub employee: Employee,
    pub outcome: AttendanceOutcome,
    /// The employee row was created by this request.
    pub employee_created: bool,
    pub message: String,
}

/// Looks the employee up by national ID, creating it on first sighting.
///
/// Returns the employee and whether it was created. A soft-deleted employee
/// is reported as [`ServiceError::NotFound`] and is not recreated.
pub fn ensure_employee<R>(
    repo: &R,
    national_id: &NationalId,
    full_name: &FullName,
    now: NaiveDateTime,
) -> ServiceResult<(Employee, bool)>
where
    R: EmployeeReader + EmployeeWriter,
{
    match repo.get_employee_by_national_id(national_id) {
        Ok(Some(employee)) if employee.active => return Ok((employee, false)),
        Ok(Some(_)) => {
            log::warn!("Attendance refused for inactive employee {national_id}");
            return Err(ServiceError::NotFound);
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to get employee {national_id}: {e}");
            return Err(e.into());
        }
    }

    let new_employee = NewEmployee::first_sighting(national_id.clone(), full_name.clone(), now);
    match repo.create_employee(&new_employee) {
        Ok(employee) => {
            log::info!("Registered employee {national_id} on first sighting");
            Ok((employee, true))
        }
        // A concurrent request created the same employee first.
        Err(RepositoryError::ConstraintViolation(_)) => {
            match repo.get_employee_by_national_id(national_id) {
                Ok(Some(employee)) if employee.active => Ok((employee, false)),
                Ok(_) => Err(ServiceError::NotFound),
                Err(e) => {
                    log::error!("Failed to reload employee {national_id}: {e}");
                    Err(e.into())
                }
            }
        }
        Err(e) => {
            log::error!("Failed to create employee {national_id}: {e}");
            Err(e.into())
        }
    }
}

/// Validates the token and applies one attendance transition at `now`.
///
/// The employee is created before the transition runs, so a rejected mark by
/// a new person still leaves the employee registered.
pub fn record_attendance<R>(
    repo: &R,
    payload: RegisterAttendancePayload,
    metadata: RequestMetadata,
    now: NaiveDateTime,
    secret: Option<&str>,
) -> ServiceResult<AttendanceReceipt>
where
    R: TokenReader + EmployeeReader + EmployeeWriter + AttendanceWriter,
{
    let token = validate_token(repo, &payload.token, now, secret)?;

    let (employee, employee_created) =
        ensure_employee(repo, &payload.national_id, &payload.full_name, now)?;

    let metadata = RequestMetadata {
        token: Some(token.to_string()),
        ..metadata
    };

    let outcome = match repo.record_attendance(employee.id, payload.kind, now, &metadata) {
        Ok(outcome) => outcome,
        Err(RepositoryError::Attendance(rejection)) => {
            log::info!(
                "Attendance {} rejected for {}: {rejection}",
                payload.kind,
                employee.national_id
            );
            return Err(rejection.into());
        }
        Err(e) => {
            log::error!("Failed to record attendance: {e}");
            return Err(e.into());
        }
    };

    log::info!(
        "Attendance {} recorded for {} at {}",
        payload.kind,
        employee.national_id,
        now.format("%H:%M:%S")
    );

    let message = receipt_message(&employee, &outcome, now);
    Ok(AttendanceReceipt {
        employee,
        outcome,
        employee_created,
        message,
    })
}

fn receipt_message(employee: &Employee, outcome: &AttendanceOutcome, now: NaiveDateTime) -> String {
    let time = now.format("%H:%M:%S");
    match (outcome.kind, outcome.worked_hours) {
        (AttendanceKind::Exit, Some(hours)) => format!(
            "Salida registrada para {} a las {time}. Horas trabajadas: {hours:.2} horas",
            employee.full_name
        ),
        (AttendanceKind::Exit, None) => {
            format!("Salida registrada para {} a las {time}", employee.full_name)
        }
        (AttendanceKind::Entry, _) => {
            format!("Entrada registrada para {} a las {time}", employee.full_name)
        }
    }
}

/// Every attendance record of one day.
pub fn attendance_for_day<R>(repo: &R, date: NaiveDate) -> ServiceResult<Vec<EmployeeAttendance>>
where
    R: AttendanceReader,
{
    repo.list_attendance(AttendanceListQuery::default().day(date))
        .map_err(|e| {
            log::error!("Failed to list attendance for {date}: {e}");
            e.into()
        })
}

/// One employee's attendance between two dates, inclusive.
pub fn attendance_for_employee<R>(
    repo: &R,
    national_id: &NationalId,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<EmployeeAttendance>>
where
    R: AttendanceReader,
{
    repo.list_attendance(
        AttendanceListQuery::default()
            .employee(national_id.clone())
            .since(from)
            .until(to),
    )
    .map_err(|e| {
        log::error!("Failed to list attendance for {national_id}: {e}");
        e.into()
    })
}
