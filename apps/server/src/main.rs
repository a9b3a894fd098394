#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use tracing::info;

use kokoromi_monitor::config::Config;
use kokoromi_monitor::seed::seed_defaults;
use kokoromi_monitor::{HttpProber, MonitorService, open_store};

mod error;
mod response;
mod routes;

use error::AppError;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    logger::init();

    let config = Config::from_config(env::var_os("KOKOROMI_CONFIG"))?;
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    let store = open_store(&config.database.path).await?;
    let added = seed_defaults(store.as_ref(), &config.defaults).await?;
    info!("API initialization completed ({} added)", added);

    let prober = HttpProber::new().map_err(anyhow::Error::from)?;
    let service = web::Data::new(MonitorService::new(store, Arc::new(prober)));
    service.initialize().await?;

    let result = run_server(addr, service.clone()).await;
    service.shutdown().await;
    result
}

async fn run_server(addr: SocketAddr, service: web::Data<MonitorService>) -> Result<(), AppError> {
    info!("Admin API listening on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(routes::json_config())
            .configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
