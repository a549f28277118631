use std::sync::Arc;

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

use crate::api::{control_error_response, store_error_response};
use crate::services::rules::{self, RulePatch};
use crate::store::EntityStore;

/// List the pre-sunrise heating rules in insertion order.
#[get("")]
pub async fn list_rules(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
) -> impl Responder {
    match store.get(&path.into_inner()).await {
        Ok(greenhouse) => HttpResponse::Ok().json(greenhouse.control_state.jojo_gaon_rules),
        Err(e) => store_error_response(&e),
    }
}

/// Append a rule with a fresh id and the default directive.
#[post("")]
pub async fn create_rule(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<String>,
) -> impl Responder {
    let greenhouse_id = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    let rule = rules::add_rule(&mut edited);

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(_) => HttpResponse::Created().json(rule),
        Err(e) => store_error_response(&e),
    }
}

/// Patch a single rule in place, preserving its position.
#[put("/{rule_id}")]
pub async fn update_rule(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<(String, String)>,
    body: web::Json<RulePatch>,
) -> impl Responder {
    let (greenhouse_id, rule_id) = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    let patch = body.into_inner();
    if let Err(e) = rules::update_rule(&mut edited, &rule_id, &patch) {
        return control_error_response(&e);
    }
    let updated_rule = edited
        .control_state
        .jojo_gaon_rules
        .iter()
        .find(|rule| rule.id == rule_id)
        .cloned();

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(_) => HttpResponse::Ok().json(updated_rule),
        Err(e) => store_error_response(&e),
    }
}

/// Delete a rule. Absent ids are a no-op.
#[delete("/{rule_id}")]
pub async fn delete_rule(
    store: web::Data<Arc<dyn EntityStore>>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (greenhouse_id, rule_id) = path.into_inner();
    let snapshot = match store.get(&greenhouse_id).await {
        Ok(g) => g,
        Err(e) => return store_error_response(&e),
    };

    let mut edited = snapshot.clone();
    rules::remove_rule(&mut edited, &rule_id);

    match store.update(&greenhouse_id, edited, snapshot.version).await {
        Ok(_) => HttpResponse::Ok().json(json!({"deleted": true})),
        Err(e) => store_error_response(&e),
    }
}
