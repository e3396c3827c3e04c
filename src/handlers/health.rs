use actix_web::web::Data;
use actix_web::{HttpResponse, Result};
use serde_json::json;

use crate::services::registry::PushRegistry;

pub async fn health_check(registry: Data<PushRegistry>) -> Result<HttpResponse> {
    match registry.subscriber_count() {
        Ok(count) => Ok(HttpResponse::Ok().json(json!({
            "status": "ok",
            "subscriptions": count
        }))),
        Err(e) => {
            log::error!("Health check could not read subscription store: {}", e);
            Ok(HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "error": e.to_string()
            })))
        }
    }
}
