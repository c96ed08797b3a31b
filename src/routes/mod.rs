use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use serde_json::json;
use tera::{Context, Tera};

use crate::services::ServiceError;

pub mod alerts;
pub mod attendance;
pub mod inventory;
pub mod sync;

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(attendance::index)
        .service(attendance::attendance_page)
        .service(attendance::register_attendance)
        .service(attendance::daily_qr)
        .service(sync::sync_employee)
        .service(sync::sync_attendance)
        .service(sync::sync_data)
        .service(sync::sync_recent_attendance)
        .service(sync::health)
        .service(
            web::scope("/api")
                .service(inventory::list_products)
                .service(inventory::append_movement)
                .service(inventory::list_movements)
                .service(inventory::stock_summary)
                .service(alerts::alert_summary)
                .service(alerts::list_alerts)
                .service(alerts::resolve_alert)
                .service(alerts::alert_history),
        );
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    render_template_with_status(tera, template, context, StatusCode::OK)
}

pub fn render_template_with_status(
    tera: &Tera,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(tera.render(template, context).unwrap_or_else(|e| {
            log::error!("Failed to render template '{template}': {e}");
            String::new()
        }))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// HTTP status reported for a service failure.
pub fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::InvalidToken | ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
            StatusCode::BAD_REQUEST
        }
        ServiceError::AlreadyEntered
        | ServiceError::AlreadyExited
        | ServiceError::NoEntryYet
        | ServiceError::UnknownProduct(_)
        | ServiceError::InsufficientStock { .. } => StatusCode::CONFLICT,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::StoreUnavailable | ServiceError::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Message shown to the person standing at the attendance page.
pub fn user_message(err: &ServiceError) -> String {
    match err {
        ServiceError::InvalidToken => {
            "Código QR inválido o expirado. Escanee el código del día.".to_string()
        }
        ServiceError::AlreadyEntered => "Ya registró su entrada hoy.".to_string(),
        ServiceError::AlreadyExited => "Ya registró su salida hoy.".to_string(),
        ServiceError::NoEntryYet => {
            "No puede registrar salida sin haber registrado entrada hoy.".to_string()
        }
        ServiceError::NotFound => "Empleado inactivo. Consulte con administración.".to_string(),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            format!("Datos inválidos: {message}")
        }
        ServiceError::UnknownProduct(code) => format!("Producto desconocido: {code}"),
        ServiceError::InsufficientStock {
            available,
            requested,
        } => format!("Stock insuficiente: disponible {available}, solicitado {requested}"),
        ServiceError::StoreUnavailable | ServiceError::Internal => {
            "Error interno. Intente nuevamente.".to_string()
        }
    }
}

/// JSON error body for API callers.
pub fn json_error(err: &ServiceError) -> HttpResponse {
    HttpResponse::build(error_status(err)).json(json!({
        "error": err.to_string(),
        "tipo": err.kind(),
    }))
}

/// JSON error for a blocking task that could not run.
pub fn blocking_error(e: actix_web::error::BlockingError) -> HttpResponse {
    log::error!("Blocking task failed: {e}");
    json_error(&ServiceError::Internal)
}
