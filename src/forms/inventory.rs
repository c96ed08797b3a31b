use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::movement::{MovementFilter, NewMovement};
use crate::domain::types::{
    MovementKind, ProductCode, Quantity, ResponsibleParty, TypeConstraintError,
};

/// Body of `POST /api/inventario/{catalogo}/movimientos`.
#[derive(Debug, Deserialize, Validate)]
pub struct AppendMovementForm {
    #[validate(length(min = 1, max = 32))]
    pub codigo: String,
    #[validate(length(min = 1))]
    pub tipo: String,
    #[validate(range(min = 1))]
    pub cantidad: i32,
    #[validate(length(min = 1, max = 150))]
    pub responsable: String,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppendMovementPayload {
    pub code: ProductCode,
    pub kind: MovementKind,
    pub quantity: Quantity,
    pub responsible: ResponsibleParty,
    pub notes: Option<String>,
}

impl AppendMovementPayload {
    pub fn into_new_movement(self, moved_at: NaiveDateTime) -> NewMovement {
        NewMovement {
            product_code: self.code,
            kind: self.kind,
            quantity: self.quantity,
            responsible: self.responsible,
            notes: self.notes,
            moved_at,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppendMovementFormError {
    #[error("Movement form validation failed: {0}")]
    Validation(String),
    #[error("Movement form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AppendMovementFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AppendMovementFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AppendMovementForm> for AppendMovementPayload {
    type Error = AppendMovementFormError;

    fn try_from(value: AppendMovementForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            code: ProductCode::new(value.codigo)?,
            kind: MovementKind::try_from(value.tipo)?,
            quantity: Quantity::new(value.cantidad)?,
            responsible: ResponsibleParty::new(value.responsable)?,
            notes: value
                .observaciones
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty()),
        })
    }
}

/// Query string of `GET /api/inventario/{catalogo}/movimientos`.
#[derive(Debug, Default, Deserialize)]
pub struct MovementHistoryQuery {
    pub codigo: Option<String>,
    pub tipo: Option<String>,
    pub desde: Option<NaiveDateTime>,
    pub hasta: Option<NaiveDateTime>,
    pub limite: Option<usize>,
}

/// Largest page the history endpoint returns.
pub const MAX_HISTORY_LIMIT: usize = 500;

impl TryFrom<MovementHistoryQuery> for MovementFilter {
    type Error = TypeConstraintError;

    fn try_from(value: MovementHistoryQuery) -> Result<Self, Self::Error> {
        let mut filter = MovementFilter::default()
            .limit(value.limite.unwrap_or(100).clamp(1, MAX_HISTORY_LIMIT));
        if let Some(code) = value.codigo.filter(|c| !c.trim().is_empty()) {
            filter = filter.product(ProductCode::new(code)?);
        }
        if let Some(kind) = value.tipo.filter(|k| !k.trim().is_empty()) {
            filter = filter.kind(MovementKind::try_from(kind)?);
        }
        filter.from = value.desde;
        filter.to = value.hasta;
        Ok(filter)
    }
}

/// Query string of `GET /api/inventario/{catalogo}/productos`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub buscar: Option<String>,
    pub todos: Option<bool>,
    pub pagina: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_movement_form() {
        let payload = AppendMovementPayload::try_from(AppendMovementForm {
            codigo: "QM003".into(),
            tipo: "salida".into(),
            cantidad: 10,
            responsable: "Bodega".into(),
            observaciones: Some("  ".into()),
        })
        .unwrap();
        assert_eq!(payload.kind, MovementKind::Exit);
        assert_eq!(payload.quantity.get(), 10);
        assert_eq!(payload.notes, None);
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let result = AppendMovementPayload::try_from(AppendMovementForm {
            codigo: "QM003".into(),
            tipo: "entrada".into(),
            cantidad: 0,
            responsable: "Bodega".into(),
            observaciones: None,
        });
        assert!(matches!(result, Err(AppendMovementFormError::Validation(_))));
    }

    #[test]
    fn history_query_caps_limit() {
        let filter = MovementFilter::try_from(MovementHistoryQuery {
            limite: Some(10_000),
            tipo: Some("entrada".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.limit, Some(MAX_HISTORY_LIMIT));
        assert_eq!(filter.kind, Some(MovementKind::Entry));
    }
}
