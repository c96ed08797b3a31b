//! Endpoints called by the replication peer, plus `/health`.

use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Local;

use crate::dto::sync::{SyncAck, SyncAttendancePayload, SyncEmployeePayload};
use crate::repository::{Repositories, StoreHealth};
use crate::routes::blocking_error;
use crate::services::health::health_report;
use crate::services::sync::{
    recent_attendance, sync_attendance as sync_attendance_service, sync_data as sync_data_service,
    sync_employee as sync_employee_service,
};

#[post("/sync_empleado")]
pub async fn sync_employee(
    payload: web::Json<SyncEmployeePayload>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let repo = repos.personnel.clone();
    let payload = payload.into_inner();

    let result = web::block(move || {
        sync_employee_service(&repo, payload, Local::now().naive_local())
    })
    .await;

    match result {
        Ok(Ok(_)) => HttpResponse::Ok().json(SyncAck::ok()),
        Ok(Err(err)) => HttpResponse::InternalServerError().json(SyncAck::error(err.to_string())),
        Err(e) => blocking_error(e),
    }
}

#[post("/sync_asistencia")]
pub async fn sync_attendance(
    payload: web::Json<SyncAttendancePayload>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let repo = repos.personnel.clone();
    let payload = payload.into_inner();

    let result = web::block(move || {
        sync_attendance_service(&repo, &payload, Local::now().naive_local())
    })
    .await;

    match result {
        Ok(Ok(_)) => HttpResponse::Ok().json(SyncAck::ok()),
        Ok(Err(err)) => HttpResponse::InternalServerError().json(SyncAck::error(err.to_string())),
        Err(e) => blocking_error(e),
    }
}

#[get("/sync_data")]
pub async fn sync_data(repos: web::Data<Repositories>) -> impl Responder {
    let repo = repos.personnel.clone();

    match web::block(move || sync_data_service(&repo)).await {
        Ok(Ok(dump)) => HttpResponse::Ok().json(dump),
        Ok(Err(err)) => HttpResponse::InternalServerError().json(SyncAck::error(err.to_string())),
        Err(e) => blocking_error(e),
    }
}

#[get("/sync_recent_asistencias")]
pub async fn sync_recent_attendance(repos: web::Data<Repositories>) -> impl Responder {
    let repo = repos.personnel.clone();
    let today = Local::now().date_naive();

    match web::block(move || recent_attendance(&repo, today)).await {
        Ok(Ok(recent)) => HttpResponse::Ok().json(recent),
        Ok(Err(err)) => HttpResponse::InternalServerError().json(SyncAck::error(err.to_string())),
        Err(e) => blocking_error(e),
    }
}

#[get("/health")]
pub async fn health(repos: web::Data<Repositories>) -> impl Responder {
    let repos = repos.get_ref().clone();

    let result = web::block(move || {
        let others: Vec<&dyn StoreHealth> = repos
            .catalogs
            .iter()
            .map(|c| c as &dyn StoreHealth)
            .chain(std::iter::once(&repos.alerts as &dyn StoreHealth))
            .collect();
        health_report(&repos.personnel, &others, Local::now().naive_local())
    })
    .await;

    match result {
        Ok(report) if report.is_healthy() => HttpResponse::Ok().json(report),
        Ok(report) => HttpResponse::ServiceUnavailable().json(report),
        Err(e) => blocking_error(e),
    }
}
