use actix_web::{get, HttpResponse, Result};

use crate::models::manifest::WebAppManifest;

#[get("/manifest.webmanifest")]
pub async fn web_app_manifest() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("application/manifest+json")
        .json(WebAppManifest::steller_seller()))
}
