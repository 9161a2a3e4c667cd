use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod handlers;

use handlers::{health, kelly, simulate};

/// Default upper bound on population_size * round_count per request
const DEFAULT_MAX_CELLS: usize = 10_000_000;
const DEFAULT_MAX_BATCH_RUNS: usize = 1_000;

/// Application state shared across handlers
pub struct AppState {
    pub max_cells: usize,
    pub max_batch_runs: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    let app_state = Arc::new(AppState {
        max_cells: env_or("MAX_SIM_CELLS", DEFAULT_MAX_CELLS),
        max_batch_runs: env_or("MAX_BATCH_RUNS", DEFAULT_MAX_BATCH_RUNS),
    });

    info!(
        max_cells = app_state.max_cells,
        max_batch_runs = app_state.max_batch_runs,
        "Starting Kelly API server at http://{}",
        addr
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route("/kelly", web::post().to(kelly::evaluate_kelly))
            .route("/simulate", web::post().to(simulate::simulate))
            .route("/simulate/batch", web::post().to(simulate::simulate_batch))
    })
    .bind(&addr)?
    .run()
    .await
}
