use actix_web::web;

use crate::handlers::decorator_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/decorators", web::get().to(decorator_handlers::get_public_decorators));
    cfg.service(
        web::scope("/decorator")
            .route("/projects", web::get().to(decorator_handlers::get_my_projects))
            .route("/projects/status/{id}", web::patch().to(decorator_handlers::update_project_status))
            .route("/bookings", web::get().to(decorator_handlers::get_assigned_bookings))
            .route("/earnings", web::get().to(decorator_handlers::get_my_earnings)),
    );
}
