use actix_web::web::{Data, Json};
use actix_web::{get, post, HttpRequest, HttpResponse, Result};
use serde::Serialize;

use crate::config::VapidConfig;
use crate::error::{PushError, NO_SUBSCRIPTION_MESSAGE};
use crate::models::{
    common::{ActionResult, DEFAULT_SUBSCRIBER},
    notification::SendNotificationRequest,
    subscription::{PlatformSubscription, RegistryState},
};
use crate::services::registry::PushRegistry;

pub const SUBSCRIBER_HEADER: &str = "X-Subscriber-Id";

#[derive(Serialize)]
pub struct StatusResponse {
    pub subscribed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: String,
}

fn subscriber_id(req: &HttpRequest) -> String {
    req.headers()
        .get(SUBSCRIBER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SUBSCRIBER)
        .to_string()
}

fn error_response(err: PushError) -> HttpResponse {
    match err {
        PushError::NoSubscription => {
            HttpResponse::NotFound().json(ActionResult::failed(NO_SUBSCRIPTION_MESSAGE))
        }
        other => {
            log::error!("Push request failed: {}", other);
            HttpResponse::InternalServerError().json(ActionResult::failed(other.to_string()))
        }
    }
}

#[post("/subscribe")]
pub async fn subscribe(
    registry: Data<PushRegistry>,
    req: HttpRequest,
    payload: Json<PlatformSubscription>,
) -> Result<HttpResponse> {
    let subscriber = subscriber_id(&req);
    match registry.subscribe(&subscriber, payload.into_inner()) {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(error_response(e)),
    }
}

#[post("/unsubscribe")]
pub async fn unsubscribe(registry: Data<PushRegistry>, req: HttpRequest) -> Result<HttpResponse> {
    let subscriber = subscriber_id(&req);
    match registry.unsubscribe(&subscriber) {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(error_response(e)),
    }
}

#[post("/send")]
pub async fn send_notification(
    registry: Data<PushRegistry>,
    req: HttpRequest,
    payload: Json<SendNotificationRequest>,
) -> Result<HttpResponse> {
    let subscriber = subscriber_id(&req);
    match registry.send_notification(&subscriber, &payload.message).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(error_response(e)),
    }
}

#[get("/status")]
pub async fn subscription_status(
    registry: Data<PushRegistry>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let subscriber = subscriber_id(&req);
    match registry.state(&subscriber) {
        Ok(state) => Ok(HttpResponse::Ok().json(StatusResponse {
            subscribed: state == RegistryState::Subscribed,
        })),
        Err(e) => Ok(error_response(e)),
    }
}

#[get("/vapid-public-key")]
pub async fn vapid_public_key(vapid: Data<VapidConfig>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(PublicKeyResponse {
        public_key: vapid.public_key.clone(),
    }))
}
