//! JSON API over the three catalog ledgers.

use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Local;
use serde_json::json;

use crate::domain::movement::MovementFilter;
use crate::domain::types::Catalog;
use crate::forms::inventory::{
    AppendMovementForm, AppendMovementPayload, MovementHistoryQuery, ProductListParams,
};
use crate::repository::{DieselCatalogRepository, Repositories};
use crate::routes::{blocking_error, json_error};
use crate::services::ServiceError;
use crate::services::ledger::{
    append_movement as append_movement_service, collect_history,
    list_products as list_products_service, stock_summary as stock_summary_service,
};

/// Repository of the catalog named in the path.
fn catalog_repo(
    repos: &Repositories,
    catalog: &str,
) -> Result<DieselCatalogRepository, HttpResponse> {
    match Catalog::try_from(catalog) {
        Ok(catalog) => Ok(repos.catalog(catalog).clone()),
        Err(_) => Err(json_error(&ServiceError::NotFound)),
    }
}

#[get("/inventario/{catalogo}/productos")]
pub async fn list_products(
    catalog: web::Path<String>,
    params: web::Query<ProductListParams>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let repo = match catalog_repo(&repos, &catalog) {
        Ok(repo) => repo,
        Err(response) => return response,
    };
    let params = params.into_inner();
    let active_only = !params.todos.unwrap_or(false);
    let page = params.pagina.unwrap_or(1);

    let result = web::block(move || {
        list_products_service(&repo, active_only, params.buscar.as_deref(), page)
    })
    .await;

    match result {
        Ok(Ok((total, products))) => HttpResponse::Ok().json(json!({
            "total": total,
            "pagina": page,
            "productos": products,
        })),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}

#[post("/inventario/{catalogo}/movimientos")]
pub async fn append_movement(
    catalog: web::Path<String>,
    form: web::Json<AppendMovementForm>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let repo = match catalog_repo(&repos, &catalog) {
        Ok(repo) => repo,
        Err(response) => return response,
    };
    let payload: AppendMovementPayload = match form.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => return json_error(&ServiceError::Form(e.to_string())),
    };

    let result = web::block(move || {
        let movement = payload.into_new_movement(Local::now().naive_local());
        append_movement_service(&repo, movement)
    })
    .await;

    match result {
        Ok(Ok(movement)) => HttpResponse::Created().json(movement),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}

#[get("/inventario/{catalogo}/movimientos")]
pub async fn list_movements(
    catalog: web::Path<String>,
    query: web::Query<MovementHistoryQuery>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let repo = match catalog_repo(&repos, &catalog) {
        Ok(repo) => repo,
        Err(response) => return response,
    };
    let filter: MovementFilter = match query.into_inner().try_into() {
        Ok(filter) => filter,
        Err(e) => return json_error(&ServiceError::from(e)),
    };

    match web::block(move || collect_history(&repo, filter)).await {
        Ok(Ok(movements)) => HttpResponse::Ok().json(movements),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}

#[get("/inventario/{catalogo}/resumen")]
pub async fn stock_summary(
    catalog: web::Path<String>,
    repos: web::Data<Repositories>,
) -> impl Responder {
    let repo = match catalog_repo(&repos, &catalog) {
        Ok(repo) => repo,
        Err(response) => return response,
    };

    match web::block(move || stock_summary_service(&repo)).await {
        Ok(Ok(summary)) => HttpResponse::Ok().json(summary),
        Ok(Err(err)) => json_error(&err),
        Err(e) => blocking_error(e),
    }
}
