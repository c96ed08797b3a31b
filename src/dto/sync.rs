//! JSON shapes exchanged with the replication peer.
//!
//! Field names are Spanish because both peers speak the same wire format.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::attendance::{EmployeeAttendance, RequestMetadata};
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::types::{AttendanceKind, BaseSalary, FullName, NationalId, TypeConstraintError};
use crate::repository::AttendanceMerge;

fn default_estado() -> i32 {
    1
}

/// Accepts `2025-01-15T08:02:10`, fractional seconds, or a space separator.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Body of `/sync_empleado`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncEmployeePayload {
    pub cedula: String,
    pub nombre_completo: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub fecha_ingreso: Option<NaiveDate>,
    #[serde(default)]
    pub area_trabajo: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
    #[serde(default)]
    pub salario_base: Option<i64>,
    #[serde(default = "default_estado")]
    pub estado: i32,
}

impl From<&Employee> for SyncEmployeePayload {
    fn from(employee: &Employee) -> Self {
        Self {
            cedula: employee.national_id.to_string(),
            nombre_completo: employee.full_name.to_string(),
            telefono: employee.phone.clone(),
            email: employee.email.clone(),
            direccion: employee.address.clone(),
            fecha_ingreso: employee.hire_date,
            area_trabajo: employee.work_area.clone(),
            cargo: employee.role.clone(),
            salario_base: employee.base_salary.map(BaseSalary::get),
            estado: i32::from(employee.active),
        }
    }
}

impl SyncEmployeePayload {
    pub fn into_new_employee(self, now: NaiveDateTime) -> Result<NewEmployee, TypeConstraintError> {
        Ok(NewEmployee {
            national_id: NationalId::new(self.cedula)?,
            full_name: FullName::new(self.nombre_completo)?,
            phone: self.telefono,
            email: self.email,
            address: self.direccion,
            hire_date: self.fecha_ingreso,
            work_area: self.area_trabajo,
            role: self.cargo,
            base_salary: self.salario_base.map(BaseSalary::new).transpose()?,
            active: self.estado != 0,
            created_at: now,
        })
    }
}

/// Body of `/sync_asistencia` and element of the bulk listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncAttendancePayload {
    pub fecha: NaiveDate,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub hora_entrada: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub hora_salida: Option<NaiveDateTime>,
    pub tipo_registro: AttendanceKind,
    #[serde(default)]
    pub token_qr: Option<String>,
    #[serde(default)]
    pub ip_registro: Option<String>,
    #[serde(default)]
    pub dispositivo: Option<String>,
    pub cedula_empleado: String,
    pub nombre_empleado: String,
}

impl From<&EmployeeAttendance> for SyncAttendancePayload {
    fn from(value: &EmployeeAttendance) -> Self {
        let record = &value.record;
        Self {
            fecha: record.work_date,
            hora_entrada: record.entry_at,
            hora_salida: record.exit_at,
            tipo_registro: record.last_action,
            token_qr: record.token.clone(),
            ip_registro: record.ip_address.clone(),
            dispositivo: record.user_agent.clone(),
            cedula_empleado: value.employee.national_id.to_string(),
            nombre_empleado: value.employee.full_name.to_string(),
        }
    }
}

impl SyncAttendancePayload {
    pub fn national_id(&self) -> Result<NationalId, TypeConstraintError> {
        NationalId::new(self.cedula_empleado.as_str())
    }

    pub fn full_name(&self) -> Result<FullName, TypeConstraintError> {
        FullName::new(self.nombre_empleado.as_str())
    }

    pub fn to_merge(&self, now: NaiveDateTime) -> AttendanceMerge {
        AttendanceMerge {
            work_date: self.fecha,
            entry_at: self.hora_entrada,
            exit_at: self.hora_salida,
            metadata: RequestMetadata {
                token: self.token_qr.clone(),
                ip_address: self.ip_registro.clone(),
                user_agent: self.dispositivo.clone(),
            },
            updated_at: now,
        }
    }
}

/// Response of `/sync_recent_asistencias`, also what the pull loop expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecentAttendance {
    pub asistencias: Vec<SyncAttendancePayload>,
}

/// Response of `/sync_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncDump {
    pub empleados: Vec<SyncEmployeePayload>,
    pub asistencias: Vec<SyncAttendancePayload>,
}

/// `{"success": true}` or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SyncAck {
    Success { success: bool },
    Error { error: String },
}

impl SyncAck {
    pub fn ok() -> Self {
        Self::Success { success: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}
