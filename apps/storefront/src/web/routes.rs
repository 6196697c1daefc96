// apps/storefront/src/web/routes.rs

use crate::web::handlers::{admin_handlers, auth_handlers, order_handlers, webhook_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth/operator")
          .route("/signin", web::post().to(auth_handlers::signin_handler))
          .route("/signout", web::post().to(auth_handlers::signout_handler)),
      )
      .service(
        web::scope("/webhooks").route("/payments", web::post().to(webhook_handlers::payment_webhook_handler)),
      )
      .service(
        web::scope("/orders")
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/declare-payment",
            web::post().to(order_handlers::declare_payment_handler),
          )
          .route("/{order_id}/addresses", web::put().to(order_handlers::update_addresses_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/revenue", web::get().to(admin_handlers::confirmed_revenue_handler))
          .route("/orders", web::get().to(admin_handlers::list_orders_handler))
          // Registered before `/orders/{order_id}/...` so "archive" is never read as an id.
          .route("/orders/archive", web::post().to(admin_handlers::bulk_archive_handler))
          .route(
            "/orders/{order_id}/confirm",
            web::post().to(admin_handlers::confirm_payment_handler),
          )
          .route("/orders/{order_id}/reject", web::post().to(admin_handlers::reject_payment_handler))
          .route(
            "/orders/{order_id}/tracking",
            web::post().to(admin_handlers::assign_tracking_handler),
          )
          .route(
            "/orders/{order_id}/delivered",
            web::post().to(admin_handlers::mark_delivered_handler),
          )
          .route("/orders/{order_id}/archive", web::post().to(admin_handlers::archive_order_handler)),
      ),
  );
}
