use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{AlertKind, Severity, StoreKind, TypeConstraintError};
use crate::repository::AlertListQuery;

/// Body of `POST /api/alertas/{id}/resolver`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ResolveAlertForm {
    #[validate(length(max = 150))]
    pub usuario: Option<String>,
    #[validate(length(max = 1000))]
    pub notas: Option<String>,
}

/// Query string of `GET /api/alertas`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    pub tipo: Option<String>,
    pub severidad: Option<String>,
    pub origen: Option<String>,
    pub todas: Option<bool>,
    pub limite: Option<usize>,
}

impl TryFrom<AlertListParams> for AlertListQuery {
    type Error = TypeConstraintError;

    fn try_from(value: AlertListParams) -> Result<Self, Self::Error> {
        let mut query = AlertListQuery::default().limit(value.limite.unwrap_or(200));
        if !value.todas.unwrap_or(false) {
            query = query.active();
        }
        if let Some(kind) = value.tipo {
            query = query.kind(AlertKind::try_from(kind)?);
        }
        if let Some(severity) = value.severidad {
            query = query.severity(Severity::try_from(severity)?);
        }
        if let Some(source) = value.origen {
            query = query.source(StoreKind::try_from(source)?);
        }
        Ok(query)
    }
}
