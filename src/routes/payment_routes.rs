use actix_web::web;

use crate::handlers::payment_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/create-checkout-session",
        web::post().to(payment_handlers::create_checkout_session),
    );
    cfg.route("/payment-success", web::post().to(payment_handlers::payment_success));
    cfg.service(
        web::scope("/payments")
            .route("/history", web::get().to(payment_handlers::get_payment_history)),
    );
}
