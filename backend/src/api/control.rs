use std::sync::Arc;

use actix_web::{post, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::api::store_error_response;
use crate::models::{ActiveMode, AutoSubType};
use crate::services::control;
use crate::store::EntityStore;

#[derive(Deserialize)]
pub struct SetModeRequest {
    pub mode: ActiveMode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSettingsRequest {
    pub use_expert_settings: Option<bool>,
    pub auto_sub_type: Option<AutoSubType>,
}

/// Switch between manual and automatic control.
#[post("/mode")]
pub async fn set_mode(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
    body: web::Json<SetModeRequest>,
) -> impl Responder {
    let greenhouse_id = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    control::set_mode(&mut edited, body.mode);

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => store_error_response(&e),
    }
}

/// Adjust the automatic-mode settings: whether the saved expert thresholds
/// are consulted, and which automatic strategy runs.
#[post("/auto")]
pub async fn update_auto_settings(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
    body: web::Json<AutoSettingsRequest>,
) -> impl Responder {
    let greenhouse_id = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    if let Some(enabled) = body.use_expert_settings {
        control::set_use_expert_settings(&mut edited, enabled);
    }
    if let Some(sub_type) = body.auto_sub_type {
        control::set_auto_sub_type(&mut edited, sub_type);
    }

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => store_error_response(&e),
    }
}
