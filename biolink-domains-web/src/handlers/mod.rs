//! HTTP handlers and route table

mod domain;
mod internal;

use actix_web::web;

pub use domain::DomainView;

/// Register every route on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/domain")
            .route("", web::get().to(domain::get_domain))
            .route("", web::put().to(domain::save_domain))
            .route("", web::delete().to(domain::delete_domain))
            .route("/availability", web::get().to(domain::check_availability))
            .route("/verify", web::post().to(domain::verify_domain))
            .route("/config", web::patch().to(domain::update_config))
            .route("/deployment", web::get().to(domain::deployment_status)),
    )
    .service(
        web::scope("/internal")
            .route(
                "/deployments/{account_id}/active",
                web::post().to(internal::mark_active),
            )
            .route("/route", web::get().to(internal::resolve_route)),
    );
}
