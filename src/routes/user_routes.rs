use actix_web::web;

use crate::handlers::{admin_handlers, user_handlers};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("", web::post().to(user_handlers::upsert_user))
            .route("/role", web::get().to(user_handlers::get_user_role)),
    );
    cfg.service(
        web::scope("/users")
            .route("/customer", web::get().to(admin_handlers::get_customers))
            .route("/decorator", web::get().to(admin_handlers::get_decorators_with_workload))
            .route("/promote/{id}", web::patch().to(admin_handlers::promote_user))
            .route("/demote/{id}", web::patch().to(admin_handlers::demote_user)),
    );
}
