mod admin_routes;
mod booking_routes;
mod decorator_routes;
mod payment_routes;
mod service_routes;
mod user_routes;

pub use admin_routes::configure as configure_admin_routes;
pub use booking_routes::configure as configure_booking_routes;
pub use decorator_routes::configure as configure_decorator_routes;
pub use payment_routes::configure as configure_payment_routes;
pub use service_routes::configure as configure_service_routes;
pub use user_routes::configure as configure_user_routes;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    configure_user_routes(cfg);
    configure_service_routes(cfg);
    configure_booking_routes(cfg);
    configure_payment_routes(cfg);
    configure_admin_routes(cfg);
    configure_decorator_routes(cfg);
}
