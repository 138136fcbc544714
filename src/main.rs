// src/main.rs
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use log::{info, warn};
use reqwest::Client;
use std::sync::Arc;

use interview::api::{AppState, configure_routes};
use interview::banner;
use interview::clients::backend::BackendClient;
use interview::clients::persisting::PersistingSink;
use interview::config::AppConfig;
use interview::database;
use interview::session::Collaborators;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        eprintln!("   Falling back to process environment and defaults");
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = AppConfig::from_env().expect("Failed to load app configuration from environment");
    info!("🔗 Interview backend at {}", app_config.backend.api_base);
    info!(
        "⏱️  Sessions last {} minutes",
        app_config.session.duration_minutes
    );

    let db_pool = match database::init_db(app_config.database_url.as_deref()).await {
        Ok(pool) => Some(Arc::new(pool)),
        Err(e) => {
            warn!("⚠️  Database unavailable, submissions will not be recorded: {}", e);
            None
        }
    };

    let backend = BackendClient::new(Client::new(), app_config.backend.clone());
    let collaborators = Collaborators {
        questions: Arc::new(backend.clone()),
        evaluator: Arc::new(backend.clone()),
        sink: Arc::new(PersistingSink::new(backend, db_pool.clone())),
    };

    let bind_addr = app_config.bind_addr.clone();
    let state = AppState::new(app_config, collaborators, db_pool);

    info!("🚀 Starting server on {}", bind_addr);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
