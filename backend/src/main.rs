use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use tokio::sync::broadcast::error::RecvError;

use backend::api;
use backend::services::prediction::{GeminiPredictor, PredictionProvider};
use backend::store::{ChangeEvent, EntityStore, MemoryStore, RemoteStore};

const STORE_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[get("/")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "EcoFarm Greenhouse Backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Entity store: remote document store when configured, in-memory otherwise.
    let store: Arc<dyn EntityStore> = match std::env::var("STORE_URL") {
        Ok(url) => {
            let token = std::env::var("STORE_TOKEN").unwrap_or_default();
            log::info!("Using remote entity store at {}", url);
            let remote = Arc::new(RemoteStore::new(url, token));
            remote.clone().spawn_poller(STORE_POLL_INTERVAL);
            remote
        }
        Err(_) => {
            log::info!("STORE_URL not set, using in-memory entity store");
            Arc::new(MemoryStore::new())
        }
    };

    let predictor: Arc<dyn PredictionProvider> = Arc::new(GeminiPredictor::from_env());

    tokio::spawn(log_change_events(store.subscribe()));

    log::info!("Starting EcoFarm Greenhouse Backend at http://0.0.0.0:8080");

    let store_data = web::Data::new(store);
    let predictor_data = web::Data::new(predictor);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(store_data.clone())
            .app_data(predictor_data.clone())
            .service(health_check)
            .configure(api::config)
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}

/// Consume the live notification channel and surface every canonical
/// snapshot in the log.
async fn log_change_events(mut events: tokio::sync::broadcast::Receiver<ChangeEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                log::debug!("Entity store changed: {} greenhouses", event.greenhouses.len())
            }
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Change subscriber lagged, skipped {} snapshots", skipped)
            }
            Err(RecvError::Closed) => break,
        }
    }
}
