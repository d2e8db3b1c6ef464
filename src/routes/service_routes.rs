use actix_web::web;

use crate::handlers::service_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/service", web::post().to(service_handlers::create_service));
    cfg.route("/services-filter", web::get().to(service_handlers::filter_services));
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(service_handlers::get_all_services))
            .route("/{id}", web::get().to(service_handlers::get_service))
            .route("/{id}", web::put().to(service_handlers::update_service))
            .route("/{id}", web::delete().to(service_handlers::delete_service)),
    );
}
