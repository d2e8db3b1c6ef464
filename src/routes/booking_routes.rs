use actix_web::web;

use crate::handlers::booking_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(booking_handlers::create_booking))
            .route("", web::get().to(booking_handlers::get_my_bookings))
            .route("/cancel/{id}", web::delete().to(booking_handlers::cancel_booking)),
    );
}
