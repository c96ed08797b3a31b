use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{App, test, web};
use campo_asistencia::domain::types::Catalog;
use campo_asistencia::models::config::ServerConfig;
use campo_asistencia::repository::ProductWriter;
use campo_asistencia::routes::configure;
use campo_asistencia::services::tokens::canonical_token;
use chrono::Local;
use serde_json::{Value, json};
use tera::Tera;

mod common;

macro_rules! init_app {
    ($test_db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($test_db.repos()))
                .app_data(web::Data::new(ServerConfig::default()))
                .app_data(web::Data::new(
                    Tera::new("templates/**/*").expect("templates should parse"),
                ))
                .configure(configure),
        )
        .await
    };
}

fn todays_token() -> String {
    canonical_token(Local::now().date_naive(), None)
        .expect("should compose token")
        .to_string()
}

#[actix_web::test]
async fn test_index_redirects_to_attendance_page() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("should carry a location");
    assert_eq!(location, format!("/asistencia?token={}", todays_token()));
}

#[actix_web::test]
async fn test_attendance_page_requires_valid_token() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let missing =
        test::call_service(&app, test::TestRequest::get().uri("/asistencia").to_request()).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let forged = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/asistencia?token=2020-01-01_00000000")
            .to_request(),
    )
    .await;
    assert_eq!(forged.status(), StatusCode::BAD_REQUEST);

    let valid = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/asistencia?token={}", todays_token()))
            .to_request(),
    )
    .await;
    assert_eq!(valid.status(), StatusCode::OK);
    let body = test::read_body(valid).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains(&todays_token()), "form should embed the token");
}

#[actix_web::test]
async fn test_register_attendance_rejects_repeated_entry() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);
    let form = [
        ("token", todays_token()),
        ("documento", "1234567".to_string()),
        ("nombre", "Carla Soto".to_string()),
        ("tipo_registro", "entrada".to_string()),
    ];

    let first = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/registrar_asistencia")
            .set_form(form.clone())
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = test::read_body(first).await;
    assert!(String::from_utf8_lossy(&body).contains("Entrada registrada para Carla Soto"));

    let second = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/registrar_asistencia")
            .set_form(form)
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_register_attendance_requires_all_fields() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/registrar_asistencia")
            .set_form([
                ("token", todays_token()),
                ("documento", "".to_string()),
                ("nombre", "Sin Documento".to_string()),
                ("tipo_registro", "entrada".to_string()),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_attendance_with_missing_key_renders_error_page() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/registrar_asistencia")
            .set_form([
                ("token", todays_token()),
                ("documento", "1234567".to_string()),
                ("nombre", "Carla Soto".to_string()),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("class=\"mensaje error\""), "error page should be rendered");
}

#[actix_web::test]
async fn test_daily_qr_returns_token_and_image() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/qr_diario").to_request(),
    )
    .await;

    assert_eq!(body["token"], todays_token());
    let url = body["url"].as_str().expect("url should be a string");
    assert!(url.ends_with(&format!("/asistencia?token={}", todays_token())));
    assert!(!body["qr_image"].as_str().unwrap_or_default().is_empty());
    assert!(body["ip_local"].is_string());
}

#[actix_web::test]
async fn test_synced_attendance_is_listed_as_recent() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);
    let today = Local::now().date_naive();

    let ack: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/sync_asistencia")
            .set_json(json!({
                "fecha": today.format("%Y-%m-%d").to_string(),
                "hora_entrada": format!("{} 07:15:00", today.format("%Y-%m-%d")),
                "hora_salida": null,
                "tipo_registro": "entrada",
                "cedula_empleado": "8080",
                "nombre_empleado": "Remoto Uno",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(ack, json!({"success": true}));

    let recent: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/sync_recent_asistencias")
            .to_request(),
    )
    .await;
    let records = recent["asistencias"]
        .as_array()
        .expect("asistencias should be an array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["cedula_empleado"], "8080");

    let dump: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/sync_data").to_request(),
    )
    .await;
    assert_eq!(dump["empleados"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn test_health_reports_every_store() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["stores"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["empleados"], 0);
}

#[actix_web::test]
async fn test_movement_api_reports_insufficient_stock() {
    let test_db = common::TestDb::new();
    test_db
        .repos()
        .catalog(Catalog::Warehouse)
        .create_product(&common::new_product(Catalog::Warehouse, "MALLA", 5, 0))
        .expect("should create product");
    let app = init_app!(test_db);

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/inventario/almacen/movimientos")
            .set_json(json!({
                "codigo": "MALLA",
                "tipo": "entrada",
                "cantidad": 10,
                "responsable": "Bodega",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let rejected = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/inventario/almacen/movimientos")
            .set_json(json!({
                "codigo": "MALLA",
                "tipo": "salida",
                "cantidad": 20,
                "responsable": "Bodega",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(rejected).await;
    assert_eq!(body["tipo"], "insufficient-stock");

    let unknown = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/inventario/bodega/resumen")
            .to_request(),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_product_list_survives_huge_page_number() {
    let test_db = common::TestDb::new();
    test_db
        .repos()
        .catalog(Catalog::Warehouse)
        .create_product(&common::new_product(Catalog::Warehouse, "MALLA", 5, 0))
        .expect("should create product");
    let app = init_app!(test_db);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/inventario/almacen/productos?pagina={}", usize::MAX))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["productos"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_alert_summary_starts_empty() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/alertas/resumen").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
}
