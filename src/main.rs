use actix_web::{web, App, HttpServer};

use chime_backend::api;
use chime_backend::config::Config;
use chime_backend::errors::AppError;
use chime_backend::services::database::Database;

#[actix_web::main]
async fn main() {
    // Import .env before the logger so RUST_LOG may come from the file.
    let env_file = Config::import_env_file();
    env_logger::init();

    if let Err(e) = run(env_file).await {
        log::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(env_file: Result<Option<std::path::PathBuf>, AppError>) -> Result<(), AppError> {
    if let Some(path) = env_file? {
        log::debug!("loaded environment from {}", path.display());
    }

    let config = Config::from_env();
    log::info!(
        "configuration loaded (port={}, database host={:?})",
        config.server.port,
        config.database.host
    );

    let database = Database::new(&config.database).await?;
    if let Err(e) = database.migrate().await {
        database.close().await;
        return Err(e);
    }
    let data = web::Data::new(database.clone());

    let server = &config.server;
    log::info!("listening on 0.0.0.0:{}", server.port);

    let result = async {
        HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .configure(api::config)
        })
        .client_request_timeout(server.read_timeout)
        .client_disconnect_timeout(server.write_timeout)
        .keep_alive(server.idle_timeout)
        .bind(("0.0.0.0", server.port))?
        .run()
        .await
    }
    .await;

    database.close().await;
    log::info!("database connection pool closed");

    result.map_err(AppError::from)
}
