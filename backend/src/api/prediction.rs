use std::sync::Arc;

use actix_web::{post, web, HttpResponse, Responder};

use crate::api::{control_error_response, prediction_error_response, store_error_response};
use crate::models::ExpertSettings;
use crate::services::control;
use crate::services::prediction::PredictionProvider;
use crate::services::validation::SetpointBounds;
use crate::store::EntityStore;

/// Request a candidate setpoint pair for the current snapshot. The candidate
/// is returned to the caller only; nothing is persisted until the operator
/// promotes it.
#[post("/fetch")]
pub async fn fetch_prediction(
    store: web::Data<Arc<dyn EntityStore>>,
    predictor: web::Data<Arc<dyn PredictionProvider>>,
    path: web::Path<String>,
) -> impl Responder {
    let greenhouse = match store.get(&path.into_inner()).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    match predictor.predict(&greenhouse).await {
        Ok(candidate) => HttpResponse::Ok().json(candidate),
        Err(e) => prediction_error_response(&e),
    }
}

/// Promote a fetched candidate: it becomes `predicted_settings`, the ML
/// optimization strategy is selected and the greenhouse switches to automatic
/// mode, all in one store update.
#[post("/promote")]
pub async fn promote_prediction(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
    body: web::Json<ExpertSettings>,
) -> impl Responder {
    let greenhouse_id = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    if let Err(e) =
        control::promote_prediction(&mut edited, body.into_inner(), &SetpointBounds::default())
    {
        return control_error_response(&e);
    }

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => store_error_response(&e),
    }
}
