use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;

use steller_seller::{
    config::Config,
    handlers,
    services::{gateway::WebPushGateway, registry::PushRegistry, store::open_store},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let store = open_store(&config.store_url).context("Failed to open subscription store")?;
    let gateway = Arc::new(WebPushGateway::new(config.vapid.clone()));
    let registry = PushRegistry::new(store, gateway, config.notification.clone());

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("🚀 Starting Steller Seller push server on {}", bind_address);
    log::info!("  POST /api/v1/push/subscribe   - Store a push subscription");
    log::info!("  POST /api/v1/push/unsubscribe - Remove the push subscription");
    log::info!("  POST /api/v1/push/send        - Send a notification");

    let registry = web::Data::new(registry);
    let vapid = web::Data::new(config.vapid.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(registry.clone())
            .app_data(vapid.clone())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
