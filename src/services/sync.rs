//! Server side of the replication bridge plus the merge of pulled records.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::attendance::AttendanceRecord;
use crate::domain::employee::{Employee, NewEmployee};
use crate::dto::sync::{
    RecentAttendance, SyncAttendancePayload, SyncDump, SyncEmployeePayload,
};
use crate::repository::{
    AttendanceListQuery, AttendanceReader, AttendanceWriter, EmployeeListQuery, EmployeeReader,
    EmployeeWriter, RepositoryError,
};

use super::{ServiceError, ServiceResult};

/// Days of attendance served to a pulling peer, today included.
pub const RECENT_DAYS: i64 = 7;

/// Counters of one batch of pulled records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    pub applied: usize,
    pub failed: usize,
}

/// Upserts one employee received from the peer, keyed by national ID.
pub fn sync_employee<R>(
    repo: &R,
    payload: SyncEmployeePayload,
    now: NaiveDateTime,
) -> ServiceResult<Employee>
where
    R: EmployeeWriter,
{
    let employee = payload.into_new_employee(now)?;
    repo.upsert_employee(&employee).map_err(|e| {
        log::error!("Failed to sync employee {}: {e}", employee.national_id);
        e.into()
    })
}

/// Upserts one attendance record received from the peer.
///
/// The employee is created from the payload when unknown. Local non-null
/// timestamps are never replaced.
pub fn sync_attendance<R>(
    repo: &R,
    payload: &SyncAttendancePayload,
    now: NaiveDateTime,
) -> ServiceResult<AttendanceRecord>
where
    R: EmployeeReader + EmployeeWriter + AttendanceWriter,
{
    let national_id = payload.national_id()?;

    let employee = match repo.get_employee_by_national_id(&national_id) {
        Ok(Some(employee)) => employee,
        Ok(None) => {
            let new_employee = NewEmployee::first_sighting(national_id, payload.full_name()?, now);
            match repo.upsert_employee(&new_employee) {
                Ok(employee) => employee,
                Err(e) => {
                    log::error!("Failed to create synced employee: {e}");
                    return Err(e.into());
                }
            }
        }
        Err(e) => {
            log::error!("Failed to get employee {national_id}: {e}");
            return Err(e.into());
        }
    };

    match repo.merge_attendance(employee.id, &payload.to_merge(now)) {
        Ok(record) => Ok(record),
        Err(RepositoryError::ValidationError(message)) => Err(ServiceError::Form(message)),
        Err(e) => {
            log::error!(
                "Failed to merge attendance of {} on {}: {e}",
                employee.national_id,
                payload.fecha
            );
            Err(e.into())
        }
    }
}

/// Every employee and attendance record.
pub fn sync_data<R>(repo: &R) -> ServiceResult<SyncDump>
where
    R: EmployeeReader + AttendanceReader,
{
    let (_, employees) = repo
        .list_employees(EmployeeListQuery::default())
        .map_err(|e| {
            log::error!("Failed to list employees for sync: {e}");
            ServiceError::from(e)
        })?;
    let attendance = repo
        .list_attendance(AttendanceListQuery::default())
        .map_err(|e| {
            log::error!("Failed to list attendance for sync: {e}");
            ServiceError::from(e)
        })?;

    Ok(SyncDump {
        empleados: employees.iter().map(SyncEmployeePayload::from).collect(),
        asistencias: attendance.iter().map(SyncAttendancePayload::from).collect(),
    })
}

/// Attendance of the last [`RECENT_DAYS`] days ending at `today`.
pub fn recent_attendance<R>(repo: &R, today: NaiveDate) -> ServiceResult<RecentAttendance>
where
    R: AttendanceReader,
{
    let since = today - Duration::days(RECENT_DAYS - 1);
    let records = repo
        .list_attendance(AttendanceListQuery::default().since(since).until(today))
        .map_err(|e| {
            log::error!("Failed to list recent attendance: {e}");
            ServiceError::from(e)
        })?;

    Ok(RecentAttendance {
        asistencias: records.iter().map(SyncAttendancePayload::from).collect(),
    })
}

/// Merges a batch pulled from the peer. Bad records are skipped and counted.
pub fn apply_pulled<R>(repo: &R, batch: &RecentAttendance, now: NaiveDateTime) -> PullReport
where
    R: EmployeeReader + EmployeeWriter + AttendanceWriter,
{
    let mut report = PullReport::default();
    for payload in &batch.asistencias {
        match sync_attendance(repo, payload, now) {
            Ok(_) => report.applied += 1,
            Err(e) => {
                log::warn!(
                    "Skipped pulled attendance of {} on {}: {e}",
                    payload.cedula_empleado,
                    payload.fecha
                );
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attendance::RequestMetadata;
    use crate::domain::types::{AttendanceKind, FullName, NationalId};
    use crate::repository::test::TestRepository;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn pulled(
        id: &str,
        entry: Option<NaiveDateTime>,
        exit: Option<NaiveDateTime>,
    ) -> SyncAttendancePayload {
        SyncAttendancePayload {
            fecha: at(15, 0, 0).date(),
            hora_entrada: entry,
            hora_salida: exit,
            tipo_registro: if exit.is_some() {
                AttendanceKind::Exit
            } else {
                AttendanceKind::Entry
            },
            token_qr: Some("2025-01-15_a1b2c3d4".to_string()),
            ip_registro: None,
            dispositivo: None,
            cedula_empleado: id.to_string(),
            nombre_empleado: "Juan Perez".to_string(),
        }
    }

    #[test]
    fn attendance_sync_creates_employee_and_is_idempotent() {
        let repo = TestRepository::personnel();
        let payload = pulled("777", Some(at(15, 8, 0)), None);

        sync_attendance(&repo, &payload, at(15, 9, 0)).unwrap();
        sync_attendance(&repo, &payload, at(15, 9, 1)).unwrap();

        assert_eq!(repo.employees().len(), 1);
        assert_eq!(repo.attendance_rows().len(), 1);
    }

    #[test]
    fn local_timestamps_are_never_overwritten() {
        let repo = TestRepository::personnel();
        let employee = repo
            .create_employee(&NewEmployee::first_sighting(
                NationalId::new("777").unwrap(),
                FullName::new("Juan Perez").unwrap(),
                at(15, 7, 0),
            ))
            .unwrap();
        repo.record_attendance(
            employee.id,
            AttendanceKind::Entry,
            at(15, 8, 0),
            &RequestMetadata::default(),
        )
        .unwrap();

        let record = sync_attendance(
            &repo,
            &pulled("777", Some(at(15, 8, 30)), Some(at(15, 17, 0))),
            at(15, 18, 0),
        )
        .unwrap();

        assert_eq!(record.entry_at, Some(at(15, 8, 0)));
        assert_eq!(record.exit_at, Some(at(15, 17, 0)));

        let record = sync_attendance(&repo, &pulled("777", None, None), at(15, 18, 5)).unwrap();
        assert_eq!(record.exit_at, Some(at(15, 17, 0)));
    }

    #[test]
    fn record_without_entry_is_a_form_error() {
        let repo = TestRepository::personnel();

        let result = sync_attendance(&repo, &pulled("1", None, None), at(15, 9, 0));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn employee_sync_upserts_by_national_id() {
        let repo = TestRepository::personnel();
        let payload: SyncEmployeePayload =
            serde_json::from_str(r#"{"cedula": "5", "nombre_completo": "Ana"}"#).unwrap();
        sync_employee(&repo, payload, at(15, 8, 0)).unwrap();
        let payload: SyncEmployeePayload = serde_json::from_str(
            r#"{"cedula": "5", "nombre_completo": "Ana Maria", "cargo": "Supervisora"}"#,
        )
        .unwrap();

        let employee = sync_employee(&repo, payload, at(15, 8, 5)).unwrap();

        assert_eq!(repo.employees().len(), 1);
        assert_eq!(employee.full_name.as_str(), "Ana Maria");
        assert_eq!(employee.role.as_deref(), Some("Supervisora"));
    }

    #[test]
    fn recent_listing_covers_seven_days() {
        let repo = TestRepository::personnel();
        for day in [5, 9, 15] {
            let mut payload = pulled("1", Some(at(day, 8, 0)), None);
            payload.fecha = at(day, 0, 0).date();
            sync_attendance(&repo, &payload, at(15, 9, 0)).unwrap();
        }

        let recent = recent_attendance(&repo, at(15, 0, 0).date()).unwrap();
        let all = sync_data(&repo).unwrap();

        assert_eq!(recent.asistencias.len(), 2);
        assert_eq!(all.asistencias.len(), 3);
        assert_eq!(all.empleados.len(), 1);
    }

    #[test]
    fn pulled_batch_counts_failures() {
        let repo = TestRepository::personnel();
        let batch = RecentAttendance {
            asistencias: vec![
                pulled("1", Some(at(15, 8, 0)), None),
                pulled("", Some(at(15, 8, 0)), None),
                pulled("2", None, None),
            ],
        };

        let report = apply_pulled(&repo, &batch, at(15, 9, 0));

        assert_eq!(report, PullReport { applied: 1, failed: 2 });
    }
}
