use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::prediction::PredictionError;
use crate::services::ControlError;
use crate::store::StoreError;

pub mod control;
pub mod devices;
pub mod greenhouses;
pub mod prediction;
pub mod rules;

pub fn config(cfg: &mut web::ServiceConfig) {
    // Greenhouse collection
    cfg.service(
        web::scope("/api/greenhouses/{greenhouse_id}/devices")
            .service(devices::list_devices)
            .service(devices::add_device)
            .service(devices::toggle_device)
            .service(devices::delete_device),
    );

    cfg.service(
        web::scope("/api/greenhouses/{greenhouse_id}/rules")
            .service(rules::list_rules)
            .service(rules::create_rule)
            .service(rules::update_rule)
            .service(rules::delete_rule),
    );

    cfg.service(
        web::scope("/api/greenhouses/{greenhouse_id}/control")
            .service(control::set_mode)
            .service(control::update_auto_settings),
    );

    cfg.service(
        web::scope("/api/greenhouses/{greenhouse_id}/prediction")
            .service(prediction::fetch_prediction)
            .service(prediction::promote_prediction),
    );

    cfg.service(
        web::scope("/api/greenhouses")
            .service(greenhouses::list_greenhouses)
            .service(greenhouses::create_greenhouse)
            .service(greenhouses::get_greenhouse)
            .service(greenhouses::update_greenhouse)
            .service(greenhouses::save_expert_settings)
            .service(greenhouses::delete_greenhouse),
    );
}

/// Validation failures block the edit and carry their tagged kind to the
/// client; nothing is partially applied.
pub(crate) fn control_error_response(error: &ControlError) -> HttpResponse {
    let message = error.to_string();
    match error {
        ControlError::DuplicateKey(_) => {
            HttpResponse::Conflict().json(json!({"error": "duplicate_key", "message": message}))
        }
        ControlError::InvalidKey(_) => {
            HttpResponse::BadRequest().json(json!({"error": "invalid_key", "message": message}))
        }
        ControlError::OutOfRange { field, value } => HttpResponse::BadRequest().json(json!({
            "error": "out_of_range",
            "field": field,
            "value": value,
            "message": message,
        })),
        ControlError::NotFound(_) => {
            HttpResponse::NotFound().json(json!({"error": "not_found", "message": message}))
        }
    }
}

pub(crate) fn store_error_response(error: &StoreError) -> HttpResponse {
    let message = error.to_string();
    match error {
        StoreError::NotFound(_) => {
            HttpResponse::NotFound().json(json!({"error": "not_found", "message": message}))
        }
        StoreError::StaleVersion { expected, actual } => {
            HttpResponse::Conflict().json(json!({
                "error": "stale_version",
                "expected": expected,
                "actual": actual,
                "message": message,
            }))
        }
        StoreError::Connection(_) => HttpResponse::BadGateway()
            .json(json!({"error": "persistence_failure", "message": message})),
        StoreError::Serialization(_) => HttpResponse::InternalServerError()
            .json(json!({"error": "persistence_failure", "message": message})),
    }
}

pub(crate) fn prediction_error_response(error: &PredictionError) -> HttpResponse {
    let message = error.to_string();
    match error {
        PredictionError::Config(_) => HttpResponse::ServiceUnavailable()
            .json(json!({"error": "prediction_config", "message": message})),
        PredictionError::Transport(_) => HttpResponse::BadGateway()
            .json(json!({"error": "prediction_transport", "message": message})),
        PredictionError::Schema(_) => HttpResponse::BadGateway()
            .json(json!({"error": "prediction_schema", "message": message})),
    }
}
