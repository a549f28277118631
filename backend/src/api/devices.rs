use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{control_error_response, store_error_response};
use crate::models::DEFAULT_DEVICE_KEYS;
use crate::services::registry;
use crate::store::EntityStore;

#[derive(Deserialize)]
pub struct AddDeviceRequest {
    pub key: String,
    pub label: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub key: String,
    pub label: String,
    pub is_on: bool,
    pub is_default: bool,
}

/// List devices in canonical display order: defaults first, then
/// alphabetical.
#[get("")]
pub async fn list_devices(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
) -> impl Responder {
    let greenhouse = match store.get(&path.into_inner()).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let response: Vec<DeviceResponse> = registry::sorted_devices(&greenhouse)
        .into_iter()
        .map(|(key, label)| DeviceResponse {
            is_on: registry::is_on(&greenhouse, &key),
            is_default: DEFAULT_DEVICE_KEYS.contains(&key.as_str()),
            key,
            label,
        })
        .collect();

    HttpResponse::Ok().json(response)
}

/// Register a new device. Its manual switch starts OFF.
#[post("")]
pub async fn add_device(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
    body: web::Json<AddDeviceRequest>,
) -> impl Responder {
    let greenhouse_id = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    if let Err(e) = registry::add_device(&mut edited, &body.key, &body.label) {
        return control_error_response(&e);
    }

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(updated) => HttpResponse::Created().json(updated),
        Err(e) => store_error_response(&e),
    }
}

/// Flip a device's manual switch. Unknown keys change nothing.
#[post("/{key}/toggle")]
pub async fn toggle_device(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (greenhouse_id, key) = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    if !snapshot.devices.contains_key(&key) {
        // Silent no-op, nothing to persist.
        return HttpResponse::Ok().json(json!({"key": key, "isOn": false}));
    }

    let mut edited = snapshot.clone();
    registry::toggle_device(&mut edited, &key);
    let is_on = registry::is_on(&edited, &key);

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(_) => HttpResponse::Ok().json(json!({"key": key, "isOn": is_on})),
        Err(e) => store_error_response(&e),
    }
}

/// Remove a device and its manual switch together. The default devices every
/// greenhouse starts with cannot be removed.
#[delete("/{key}")]
pub async fn delete_device(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (greenhouse_id, key) = path.into_inner();

    if DEFAULT_DEVICE_KEYS.contains(&key.as_str()) {
        return HttpResponse::BadRequest().json(json!({
            "error": "default_device",
            "message": format!("Default device cannot be removed: {}", key),
        }));
    }

    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    if let Err(e) = registry::remove_device(&mut edited, &key) {
        return control_error_response(&e);
    }

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(_) => HttpResponse::Ok().json(json!({"deleted": true})),
        Err(e) => store_error_response(&e),
    }
}
