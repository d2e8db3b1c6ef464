use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::config::{AppConfig, DuplicatePolicy};
use crate::models::{ApiError, BookingStatus, CreateBookingRequest, PagedBookings};
use crate::services::MongoDBService;
use crate::utils::Pagination;

use super::parse_object_id;

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub status: Option<BookingStatus>,
}

pub async fn create_booking(
    booking_data: web::Json<CreateBookingRequest>,
    db: web::Data<MongoDBService>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let booking = booking_data.into_inner().into_booking();

    if config.duplicate_policy == DuplicatePolicy::Reject {
        let duplicate = db
            .find_unpaid_duplicate(
                &booking.service_id,
                &booking.customer.email,
                &booking.booking_date,
                &booking.location,
            )
            .await?;
        if duplicate.is_some() {
            return Err(ApiError::DuplicateBooking(
                "An unpaid booking for this service, date and location already exists".to_string(),
            ));
        }
    }

    let created = db.create_booking(booking).await?;
    info!(
        "Created booking {} for {}",
        created.id.map(|id| id.to_hex()).unwrap_or_default(),
        created.customer.email
    );
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_my_bookings(
    user: AuthenticatedUser,
    query: web::Query<BookingListQuery>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let page = Pagination::new(query.page, query.limit);
    let (bookings, total) = db
        .get_customer_bookings(&user.email, query.status, &page)
        .await?;
    Ok(HttpResponse::Ok().json(PagedBookings {
        bookings,
        total,
        page: page.page,
        total_pages: page.total_pages(total),
    }))
}

pub async fn cancel_booking(
    booking_id: web::Path<String>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&booking_id, "booking")?;
    if db.delete_booking(&object_id).await? {
        info!("Cancelled booking {}", booking_id);
        Ok(HttpResponse::Ok().json(json!({ "message": "Booking cancelled successfully" })))
    } else {
        Err(ApiError::NotFound(format!(
            "Booking with id {} not found",
            booking_id
        )))
    }
}
