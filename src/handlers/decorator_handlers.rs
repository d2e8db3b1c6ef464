use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::auth::DecoratorUser;
use crate::models::{ApiError, BookingStatus, PagedBookings, UpdateStatusRequest};
use crate::services::{DecoratorService, MongoDBService};
use crate::utils::Pagination;

use super::parse_object_id;

#[derive(Debug, Deserialize)]
pub struct DecoratorBookingQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub status: Option<BookingStatus>,
}

/// Public roster of decorator profiles shown on the site.
pub async fn get_public_decorators(
    decorators: web::Data<DecoratorService>,
) -> Result<HttpResponse, ApiError> {
    let profiles = decorators.list_profiles().await?;
    Ok(HttpResponse::Ok().json(profiles))
}

pub async fn get_my_projects(
    user: DecoratorUser,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let projects = db.get_decorator_projects(&user.email).await?;
    Ok(HttpResponse::Ok().json(projects))
}

pub async fn get_assigned_bookings(
    user: DecoratorUser,
    query: web::Query<DecoratorBookingQuery>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let page = Pagination::new(query.page, query.limit);
    let (bookings, total) = db
        .get_decorator_bookings(&user.email, query.status, &page)
        .await?;
    Ok(HttpResponse::Ok().json(PagedBookings {
        bookings,
        total,
        page: page.page,
        total_pages: page.total_pages(total),
    }))
}

pub async fn get_my_earnings(
    user: DecoratorUser,
    decorators: web::Data<DecoratorService>,
) -> Result<HttpResponse, ApiError> {
    let summary = decorators.earnings(&user.email).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn update_project_status(
    user: DecoratorUser,
    booking_id: web::Path<String>,
    update: web::Json<UpdateStatusRequest>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&booking_id, "booking")?;
    let booking = db
        .update_decorator_booking_status(&object_id, update.status, &user.email)
        .await?;
    info!(
        "Booking {} moved to {} by {}",
        booking_id,
        update.status.as_str(),
        user.email
    );
    Ok(HttpResponse::Ok().json(booking))
}
