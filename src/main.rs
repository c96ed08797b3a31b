use std::net::TcpListener;
use std::time::Duration;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{Config, Environment, File};
use tera::Tera;
use tokio_util::sync::CancellationToken;

use campo_asistencia::background::{alert_monitor, replication_pull};
use campo_asistencia::db::Stores;
use campo_asistencia::models::config::ServerConfig;
use campo_asistencia::replication::ReplicationClient;
use campo_asistencia::repository::Repositories;
use campo_asistencia::routes::configure;

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

/// Binds the configured port, falling back to `fallback_port` when taken.
fn bind(config: &ServerConfig) -> std::io::Result<TcpListener> {
    match TcpListener::bind((config.address.as_str(), config.port)) {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            log::warn!(
                "Port {} in use, falling back to {}",
                config.port,
                config.fallback_port
            );
            TcpListener::bind((config.address.as_str(), config.fallback_port))
        }
        Err(e) => Err(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut server_config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let stores = match Stores::open(&server_config.database_dir) {
        Ok(stores) => stores,
        Err(e) => {
            log::error!("Failed to open stores in {}: {e}", server_config.database_dir);
            std::process::exit(1);
        }
    };
    let repos = Repositories::new(&stores);

    let tera = match Tera::new(&server_config.templates_dir) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Failed to parse templates: {e}");
            std::process::exit(1);
        }
    };

    let listener = bind(&server_config)?;
    server_config.port = listener.local_addr()?.port();

    let replication = match server_config.peer_url.as_deref() {
        Some(peer) => match ReplicationClient::new(peer, &server_config.replication) {
            Ok(client) => Some(client),
            Err(e) => {
                log::error!("Replication disabled, failed to build client: {e}");
                None
            }
        },
        None => None,
    };

    let cancel = CancellationToken::new();
    let monitor = actix_web::rt::spawn(alert_monitor::run(
        repos.clone(),
        server_config.monitor.clone(),
        cancel.clone(),
    ));
    let pull = replication.clone().map(|client| {
        actix_web::rt::spawn(replication_pull::run(
            client,
            repos.personnel.clone(),
            Duration::from_secs(server_config.replication.pull_interval_secs),
            cancel.clone(),
        ))
    });

    log::info!(
        "Starting attendance service on {}:{}",
        server_config.address,
        server_config.port
    );

    let server_config_data = web::Data::new(server_config);
    let repos_data = web::Data::new(repos);
    let tera_data = web::Data::new(tera);
    let replication_data = replication.map(web::Data::new);

    let result = HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(repos_data.clone())
            .app_data(server_config_data.clone())
            .app_data(tera_data.clone());
        if let Some(client) = &replication_data {
            app = app.app_data(client.clone());
        }
        app.configure(configure)
    })
    .listen(listener)?
    .run()
    .await;

    cancel.cancel();
    if let Err(e) = monitor.await {
        log::error!("Alert monitor task failed: {e}");
    }
    if let Some(pull) = pull {
        if let Err(e) = pull.await {
            log::error!("Replication pull task failed: {e}");
        }
    }

    result
}
