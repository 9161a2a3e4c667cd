use actix_web::{web, HttpResponse};

use kelly_sim::core::kelly::evaluate;
use kelly_sim::error::{validate_finite, AppError};
use kelly_sim::models::{KellyRequest, KellyResponse};

/// Evaluate the Kelly criterion
///
/// Out-of-range inputs are clamped; only non-numeric values are rejected.
pub async fn evaluate_kelly(req: web::Json<KellyRequest>) -> Result<HttpResponse, AppError> {
    validate_finite("win_rate", req.win_rate)?;
    validate_finite("win_loss_ratio", req.win_loss_ratio)?;

    let result = evaluate(req.win_rate, req.win_loss_ratio);

    Ok(HttpResponse::Ok().json(KellyResponse::from(result)))
}
