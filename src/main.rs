use actix_web::{web, App, HttpServer};
use log::{error, info, warn};

use evently_gateway::config::AppConfig;
use evently_gateway::db;
use evently_gateway::gateway::Gateway;
use evently_gateway::logger::setup_logger;
use evently_gateway::middleware::{cors, RequestLogger};
use evently_gateway::routes;

fn init_schema(database_url: &str) -> Result<(), evently_gateway::DbError> {
    let mut conn = db::establish(database_url)?;
    db::run_migrations(&mut conn)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables and initialize logger
    dotenvy::dotenv().ok();
    setup_logger();

    // Load and validate configuration
    let config = AppConfig::from_env();
    if let Err(e) = config.validate() {
        error!("Configuration validation error: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
    }

    match config.database_url.as_deref() {
        Some(url) => {
            if let Err(e) = init_schema(url) {
                error!("Failed to initialise database schema: {}", e);
                return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
            }
        },
        None => warn!("Skipping schema initialisation"),
    }

    let gateway = Gateway::new(config.clone()).map_err(|e| {
        error!("Failed to build backend client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let gateway = web::Data::new(gateway);

    let host = config.host.clone();
    let port = config.port;
    let site_url = config.site_url.clone();

    info!("Forwarding to backend at {}", config.api_url);
    info!("Starting HTTP server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .wrap(cors(&site_url))
            .app_data(gateway.clone())
            .service(web::scope("/api").configure(routes::configure))
    })
    .keep_alive(std::time::Duration::from_secs(75))
    .shutdown_timeout(30)
    .bind((host, port))?
    .run()
    .await
}
