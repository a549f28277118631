use std::sync::Arc;

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::api::{control_error_response, store_error_response};
use crate::models::{ExpertSettings, Greenhouse};
use crate::services::control;
use crate::services::validation::SetpointBounds;
use crate::store::EntityStore;

#[derive(Deserialize)]
pub struct CreateGreenhouseRequest {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGreenhouseRequest {
    pub name: Option<String>,
    pub planting_date: Option<NaiveDate>,
}

/// List all greenhouses.
#[get("")]
pub async fn list_greenhouses(store: web::Data<Arc<dyn EntityStore>>) -> impl Responder {
    match store.get_all().await {
        Ok(greenhouses) => HttpResponse::Ok().json(greenhouses),
        Err(e) => store_error_response(&e),
    }
}

/// Create a greenhouse with the hard-coded defaults; the store assigns the id.
#[post("")]
pub async fn create_greenhouse(
    store: web::Data<Arc<dyn EntityStore>>,
    body: web::Json<CreateGreenhouseRequest>,
) -> impl Responder {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({"error": "invalid_name", "message": "Name must not be empty"}));
    }

    match store.create(Greenhouse::with_defaults(name)).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => store_error_response(&e),
    }
}

#[get("/{greenhouse_id}")]
pub async fn get_greenhouse(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
) -> impl Responder {
    match store.get(&path.into_inner()).await {
        Ok(greenhouse) => HttpResponse::Ok().json(greenhouse),
        Err(e) => store_error_response(&e),
    }
}

/// Rename a greenhouse or move its planting date.
#[put("/{greenhouse_id}")]
pub async fn update_greenhouse(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
    body: web::Json<UpdateGreenhouseRequest>,
) -> impl Responder {
    let greenhouse_id = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    if let Some(ref name) = body.name {
        if name.trim().is_empty() {
            return HttpResponse::BadRequest()
                .json(json!({"error": "invalid_name", "message": "Name must not be empty"}));
        }
        edited.name = name.trim().to_string();
    }
    if let Some(planting_date) = body.planting_date {
        edited.planting_date = planting_date;
    }

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => store_error_response(&e),
    }
}

/// Replace the saved expert thresholds. Out-of-range or inverted setpoints
/// are rejected and the stored pair is kept.
#[put("/{greenhouse_id}/settings")]
pub async fn save_expert_settings(
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
        control::save_expert_settings(&mut edited, body.into_inner(), &SetpointBounds::default())
    {
        return control_error_response(&e);
    }

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => store_error_response(&e),
    }
}

/// Delete the aggregate and all nested data permanently.
#[delete("/{greenhouse_id}")]
pub async fn delete_greenhouse(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
) -> impl Responder {
    match store.delete(&path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({"deleted": true})),
        Err(e) => store_error_response(&e),
    }
}
