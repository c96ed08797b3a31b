//! JSON API over the alert store.

use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Local;
use validator::Validate;

use crate::domain::types::AlertId;
use crate::forms::alerts::{AlertListParams, ResolveAlertForm};
use crate::repository::{AlertListQuery, Repositories};
use crate::routes::{blocking_error, json_error};
use crate::services::ServiceError;
use crate::services::alerts::{
    alert_history as alert_history_service, alert_summary as alert_summary_service,
    list_active_alerts, resolve_alert as resolve_alert_service,
};

#[get("/alertas")]
pub async fn list_alerts(
    params: web::Query<AlertListParams>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let query: AlertListQuery = match params.into_inner().try_into() {
        Ok(query) => query,
        Err(e) => return json_error(&ServiceError::from(e)),
    };
    let repo = repos.alerts.clone();

    match web::block(move || list_active_alerts(&repo, query)).await {
        Ok(Ok(alerts)) => HttpResponse::Ok().json(alerts),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}

#[get("/alertas/resumen")]
pub async fn alert_summary(repos: web::Data<Repositories>) -> impl Responder {
    let repo = repos.alerts.clone();

    match web::block(move || alert_summary_service(&repo)).await {
        Ok(Ok(summary)) => HttpResponse::Ok().json(summary),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}

#[post("/alertas/{id}/resolver")]
pub async fn resolve_alert(
    id: web::Path<i32>,
    form: Option<web::Json<ResolveAlertForm>>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let Ok(id) = AlertId::new(id.into_inner()) else {
        return json_error(&ServiceError::NotFound);
    };
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    if let Err(e) = form.validate() {
        return json_error(&ServiceError::Form(e.to_string()));
    }
    let repo = repos.alerts.clone();

    let result = web::block(move || {
        resolve_alert_service(
            &repo,
            id,
            form.usuario.as_deref(),
            form.notas.as_deref(),
            Local::now().naive_local(),
        )
    })
    .await;

    match result {
        Ok(Ok(alert)) => HttpResponse::Ok().json(alert),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}

#[get("/alertas/{id}/historial")]
pub async fn alert_history(
    id: web::Path<i32>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let Ok(id) = AlertId::new(id.into_inner()) else {
        return json_error(&ServiceError::NotFound);
    };
    let repo = repos.alerts.clone();

    match web::block(move || alert_history_service(&repo, id)).await {
        Ok(Ok(history)) => HttpResponse::Ok().json(history),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}
