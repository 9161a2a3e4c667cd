use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::models::ErrorResponse;
use crate::simulation::SimulationConfig;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Invalid request data
    ValidationError(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("validation_error", msg.clone()),
            AppError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

/// Validation functions
pub fn validate_finite(name: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::ValidationError(format!(
            "{} must be a finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Reject simulations larger than `max_cells` bettor-rounds
pub fn validate_simulation_size(
    config: &SimulationConfig,
    max_cells: usize,
) -> Result<(), AppError> {
    let cells = config.cells();
    if cells > max_cells {
        return Err(AppError::ValidationError(format!(
            "population_size * round_count must be at most {}, got {}",
            max_cells, cells
        )));
    }
    Ok(())
}

/// Reject batches whose total work (`cells * runs`) exceeds `max_cells`
pub fn validate_batch_size(
    config: &SimulationConfig,
    runs: usize,
    max_cells: usize,
) -> Result<(), AppError> {
    let total = config.cells().saturating_mul(runs);
    if total > max_cells {
        return Err(AppError::ValidationError(format!(
            "population_size * round_count * runs must be at most {}, got {}",
            max_cells, total
        )));
    }
    Ok(())
}

pub fn validate_runs(runs: usize, max_runs: usize) -> Result<(), AppError> {
    if runs == 0 || runs > max_runs {
        return Err(AppError::ValidationError(format!(
            "runs must be between 1 and {}, got {}",
            max_runs, runs
        )));
    }
    Ok(())
}

/// Check every numeric field of a simulation config
pub fn validate_simulation_config(
    config: &SimulationConfig,
    max_cells: usize,
) -> Result<(), AppError> {
    validate_finite("win_probability", config.win_probability)?;
    validate_finite("payout_ratio", config.payout_ratio)?;
    validate_finite("initial_bankroll", config.initial_bankroll)?;
    validate_finite("conservative_fraction", config.conservative_fraction)?;
    validate_finite("aggressive_fraction", config.aggressive_fraction)?;
    validate_finite("ruin_threshold", config.ruin_threshold)?;
    validate_finite("jackpot_threshold", config.jackpot_threshold)?;
    if let Some(f) = config.kelly_fraction {
        validate_finite("kelly_fraction", f)?;
    }
    validate_simulation_size(config, max_cells)
}
