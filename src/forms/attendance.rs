use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{AttendanceKind, FullName, NationalId, TypeConstraintError};

/// Fields posted by the public attendance page.
///
/// Missing keys deserialize as empty so validation reports them.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterAttendanceForm {
    #[validate(length(min = 1, message = "token requerido"))]
    pub token: String,
    #[validate(length(min = 1, max = 32, message = "documento requerido"))]
    pub documento: String,
    #[validate(length(min = 1, max = 150, message = "nombre requerido"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "tipo de registro requerido"))]
    pub tipo_registro: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterAttendancePayload {
    /// Raw token, checked against the registry by the service.
    pub token: String,
    pub national_id: NationalId,
    pub full_name: FullName,
    pub kind: AttendanceKind,
}

#[derive(Debug, Error)]
pub enum RegisterAttendanceFormError {
    #[error("Attendance form validation failed: {0}")]
    Validation(String),
    #[error("Attendance form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for RegisterAttendanceFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for RegisterAttendanceFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<RegisterAttendanceForm> for RegisterAttendancePayload {
    type Error = RegisterAttendanceFormError;

    fn try_from(value: RegisterAttendanceForm) -> Result<Self, Self::Error> {
        let value = RegisterAttendanceForm {
            token: value.token.trim().to_string(),
            documento: value.documento.trim().to_string(),
            nombre: value.nombre.trim().to_string(),
            tipo_registro: value.tipo_registro.trim().to_string(),
        };
        value.validate()?;

        Ok(Self {
            token: value.token,
            national_id: NationalId::new(value.documento)?,
            full_name: FullName::new(value.nombre)?,
            kind: AttendanceKind::try_from(value.tipo_registro)?,
        })
    }
}

/// Query string of the attendance page.
#[derive(Debug, Deserialize)]
pub struct AttendancePageQuery {
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(documento: &str, nombre: &str, tipo: &str) -> RegisterAttendanceForm {
        RegisterAttendanceForm {
            token: "2025-01-15_a1b2c3d4".to_string(),
            documento: documento.to_string(),
            nombre: nombre.to_string(),
            tipo_registro: tipo.to_string(),
        }
    }

    #[test]
    fn trims_and_converts_fields() {
        let payload =
            RegisterAttendancePayload::try_from(form(" 12345678 ", " Juan Perez ", "entrada"))
                .unwrap();
        assert_eq!(payload.national_id.as_str(), "12345678");
        assert_eq!(payload.full_name.as_str(), "Juan Perez");
        assert_eq!(payload.kind, AttendanceKind::Entry);
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(matches!(
            RegisterAttendancePayload::try_from(form("   ", "Juan", "entrada")),
            Err(RegisterAttendanceFormError::Validation(_))
        ));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(matches!(
            RegisterAttendancePayload::try_from(form("1", "Juan", "almuerzo")),
            Err(RegisterAttendanceFormError::TypeConstraint(_))
        ));
    }

    #[test]
    fn missing_keys_fail_validation() {
        let form: RegisterAttendanceForm =
            serde_json::from_str(r#"{"token": "2025-01-15_a1b2c3d4", "documento": "1"}"#)
                .unwrap();
        assert_eq!(form.tipo_registro, "");
        assert!(matches!(
            RegisterAttendancePayload::try_from(form),
            Err(RegisterAttendanceFormError::Validation(_))
        ));
    }
}
