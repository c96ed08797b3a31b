use actix_web::http::header::USER_AGENT;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use chrono::Local;
use tera::{Context, Tera};

use crate::domain::attendance::{EmployeeAttendance, RequestMetadata};
use crate::dto::sync::{SyncAttendancePayload, SyncEmployeePayload};
use crate::forms::attendance::{
    AttendancePageQuery, RegisterAttendanceForm, RegisterAttendanceFormError,
    RegisterAttendancePayload,
};
use crate::models::config::ServerConfig;
use crate::qr::local_ip;
use crate::replication::{ReplicationClient, push_after_write};
use crate::repository::Repositories;
use crate::routes::{
    blocking_error, error_status, json_error, redirect, render_template,
    render_template_with_status, user_message,
};
use crate::services::ServiceError;
use crate::services::attendance::{AttendanceReceipt, record_attendance};
use crate::services::tokens::{daily_qr as daily_qr_service, todays_token, validate_token};

fn error_page(tera: &Tera, err: &ServiceError) -> HttpResponse {
    let mut context = Context::new();
    context.insert("message", &user_message(err));
    context.insert("kind", err.kind());
    render_template_with_status(tera, "attendance/error.html", &context, error_status(err))
}

fn internal_error_page(tera: &Tera, e: actix_web::error::BlockingError) -> HttpResponse {
    log::error!("Blocking task failed: {e}");
    error_page(tera, &ServiceError::Internal)
}

#[get("/")]
pub async fn index(
    repos: web::Data<Repositories>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let repo = repos.personnel.clone();
    let secret = server_config.token_secret.clone();
    let today = Local::now().date_naive();

    match web::block(move || todays_token(&repo, today, secret.as_deref())).await {
        Ok(Ok(token)) => redirect(&format!("/asistencia?token={}", token.token)),
        Ok(Err(err)) => error_page(&tera, &err),
        Err(e) => internal_error_page(&tera, e),
    }
}

#[get("/asistencia")]
pub async fn attendance_page(
    query: web::Query<AttendancePageQuery>,
    repos: web::Data<Repositories>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(raw) = query
        .into_inner()
        .token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
    else {
        return error_page(&tera, &ServiceError::InvalidToken);
    };

    let repo = repos.personnel.clone();
    let secret = server_config.token_secret.clone();
    let now = Local::now().naive_local();

    match web::block(move || validate_token(&repo, &raw, now, secret.as_deref())).await {
        Ok(Ok(token)) => {
            let mut context = Context::new();
            context.insert("token", token.as_str());
            context.insert("fecha", &now.date().format("%d/%m/%Y").to_string());
            render_template(&tera, "attendance/form.html", &context)
        }
        Ok(Err(err)) => error_page(&tera, &err),
        Err(e) => internal_error_page(&tera, e),
    }
}

fn request_metadata(req: &HttpRequest) -> RequestMetadata {
    RequestMetadata {
        token: None,
        ip_address: req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_string),
        user_agent: req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

fn replicate(client: &ReplicationClient, receipt: &AttendanceReceipt) {
    let attendance = SyncAttendancePayload::from(&EmployeeAttendance {
        employee: receipt.employee.clone(),
        record: receipt.outcome.record.clone(),
    });
    let employee = receipt
        .employee_created
        .then(|| SyncEmployeePayload::from(&receipt.employee));
    actix_web::rt::spawn(push_after_write(client.clone(), attendance, employee));
}

#[post("/registrar_asistencia")]
pub async fn register_attendance(
    req: HttpRequest,
    form: web::Form<RegisterAttendanceForm>,
    repos: web::Data<Repositories>,
    server_config: web::Data<ServerConfig>,
    replication: Option<web::Data<ReplicationClient>>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let payload: RegisterAttendancePayload = match form.into_inner().try_into() {
        Ok(payload) => payload,
        Err(RegisterAttendanceFormError::Validation(e)) => {
            log::warn!("Rejected attendance form: {e}");
            return error_page(
                &tera,
                &ServiceError::Form("todos los campos son obligatorios".to_string()),
            );
        }
        Err(RegisterAttendanceFormError::TypeConstraint(e)) => {
            return error_page(&tera, &ServiceError::TypeConstraint(e));
        }
    };

    let metadata = request_metadata(&req);
    let repo = repos.personnel.clone();
    let secret = server_config.token_secret.clone();

    let result = web::block(move || {
        let now = Local::now().naive_local();
        record_attendance(&repo, payload, metadata, now, secret.as_deref())
    })
    .await;

    let receipt = match result {
        Ok(Ok(receipt)) => receipt,
        Ok(Err(err)) => return error_page(&tera, &err),
        Err(e) => return internal_error_page(&tera, e),
    };

    if let Some(client) = replication {
        replicate(client.get_ref(), &receipt);
    }

    let mut context = Context::new();
    context.insert("message", &receipt.message);
    context.insert("nombre", receipt.employee.full_name.as_str());
    context.insert("tipo", receipt.outcome.kind.as_str());
    context.insert("horas", &receipt.outcome.worked_hours);
    render_template(&tera, "attendance/result.html", &context)
}

#[get("/qr_diario")]
pub async fn daily_qr(
    repos: web::Data<Repositories>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let ip_local = local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let base_url = server_config
        .peer_url
        .clone()
        .or_else(|| server_config.public_url.clone())
        .unwrap_or_else(|| format!("http://{ip_local}:{}", server_config.port));

    let repo = repos.personnel.clone();
    let secret = server_config.token_secret.clone();
    let today = Local::now().date_naive();

    let result = web::block(move || {
        daily_qr_service(&repo, today, secret.as_deref(), &base_url, &ip_local)
    })
    .await;

    match result {
        Ok(Ok(qr)) => HttpResponse::Ok().json(qr),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}
