use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use kelly_sim::error::{
    validate_batch_size, validate_runs, validate_simulation_config, AppError,
};
use kelly_sim::models::{
    BatchRequest, BatchResponse, SimulateRequest, SimulateResponse,
};
use kelly_sim::simulation::{run_batch, StrategySimulator};

/// Run one simulation
pub async fn simulate(
    state: web::Data<Arc<AppState>>,
    req: web::Json<SimulateRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    validate_simulation_config(&req.config, state.max_cells)?;

    let seed = req.seed.unwrap_or_else(rand::random);
    info!(seed, cells = req.config.cells(), "Running simulation");

    let response = web::block(move || {
        let simulator = StrategySimulator::new(req.config);
        let result = simulator.run_seeded(seed);
        SimulateResponse::new(seed, simulator.kelly_fraction(), result)
    })
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(response))
}

/// Run many simulations and return aggregates only
pub async fn simulate_batch(
    state: web::Data<Arc<AppState>>,
    req: web::Json<BatchRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    validate_simulation_config(&req.config, state.max_cells)?;
    validate_runs(req.runs, state.max_batch_runs)?;
    validate_batch_size(&req.config, req.runs, state.max_cells)?;

    let seed = req.seed.unwrap_or_else(rand::random);
    info!(seed, runs = req.runs, "Running batch");

    let response = web::block(move || {
        let batch = run_batch(&req.config, seed, req.runs);
        BatchResponse {
            base_seed: batch.base_seed,
            runs: batch.runs.len(),
            aggregates: batch.aggregates,
        }
    })
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(response))
}
