pub mod health;
pub mod manifest;
pub mod push;

use actix_web::web;

/// Mounts every route. Expects `Data<PushRegistry>` and `Data<VapidConfig>`
/// to be registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(manifest::web_app_manifest).service(
        web::scope("/api/v1")
            // Push notifications
            .service(
                web::scope("/push")
                    .service(push::subscribe)
                    .service(push::unsubscribe)
                    .service(push::send_notification)
                    .service(push::subscription_status)
                    .service(push::vapid_public_key),
            )
            // Health check
            .route("/health", web::get().to(health::health_check)),
    );
}
