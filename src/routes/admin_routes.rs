use actix_web::web;

use crate::handlers::{admin_handlers, analytics_handlers};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/bookings", web::get().to(admin_handlers::get_all_bookings))
            .route("/bookings/assign/{id}", web::patch().to(admin_handlers::assign_decorator))
            .route("/analytics/summary", web::get().to(analytics_handlers::get_summary))
            .route("/analytics/service-demand", web::get().to(analytics_handlers::get_service_demand))
            .route("/analytics/status-distribution", web::get().to(analytics_handlers::get_status_distribution)),
    );
}
