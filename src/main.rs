use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use log::info;

mod auth;
mod config;
mod handlers;
mod models;
mod routes;
mod services;
mod utils;

use config::AppConfig;
use services::{CheckoutService, DecoratorService, FirebaseAuth, MongoDBService};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    let config = AppConfig::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.log_level.clone()));

    info!(
        "Configured for database '{}' with {:?} reconciliation",
        config.database, config.reconciliation
    );

    let mongodb = MongoDBService::init(&config)
        .await
        .expect("Failed to initialize MongoDB");
    let mongodb_data = web::Data::new(mongodb);
    let mongodb_arc = Arc::new(mongodb_data.get_ref().clone());

    let firebase_auth = web::Data::new(FirebaseAuth::new(config.firebase_project_id.clone()));

    let stripe_client = Arc::new(stripe::Client::new(&config.stripe_secret_key));
    let checkout_service = web::Data::new(CheckoutService::new(
        stripe_client,
        mongodb_arc.clone(),
        &config,
    ));
    let decorator_service = web::Data::new(DecoratorService::new(mongodb_arc));

    let host = config.host.clone();
    let port = config.port;
    let config_data = web::Data::new(config);

    info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        // Configure CORS middleware
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_headers(vec!["content-type", "content-length", "accept"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(mongodb_data.clone())
            .app_data(firebase_auth.clone())
            .app_data(checkout_service.clone())
            .app_data(decorator_service.clone())
            .app_data(config_data.clone())
            .configure(routes::configure)
            .route("/health", web::get().to(|| async {
                info!("Health check");
                HttpResponse::Ok().body("OK")
            }))
    })
    .bind(format!("{host}:{port}"))?
    .run()
    .await?;

    info!("Server shutting down");
    Ok(())
}
