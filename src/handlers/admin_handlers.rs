use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::models::{ApiError, AssignDecoratorRequest, BookingStatus, PagedBookings, UserRole};
use crate::services::{DecoratorService, MongoDBService};
use crate::utils::Pagination;

use super::parse_object_id;

#[derive(Debug, Deserialize)]
pub struct AdminBookingListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub status: Option<BookingStatus>,
    pub payment: Option<bool>,
}

pub async fn get_all_bookings(
    _admin: AdminUser,
    query: web::Query<AdminBookingListQuery>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let page = Pagination::new(query.page, query.limit);
    let (bookings, total) = db
        .get_all_bookings(query.status, query.payment, &page)
        .await?;
    Ok(HttpResponse::Ok().json(PagedBookings {
        bookings,
        total,
        page: page.page,
        total_pages: page.total_pages(total),
    }))
}

pub async fn assign_decorator(
    _admin: AdminUser,
    booking_id: web::Path<String>,
    assignment: web::Json<AssignDecoratorRequest>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&booking_id, "booking")?;
    let booking = db
        .assign_decorator(&object_id, &assignment.name, &assignment.email)
        .await?;
    info!("Assigned {} to booking {}", assignment.email, booking_id);
    Ok(HttpResponse::Ok().json(booking))
}

pub async fn get_customers(
    _admin: AdminUser,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let customers = db.get_users_by_role(UserRole::Customer).await?;
    Ok(HttpResponse::Ok().json(customers))
}

pub async fn get_decorators_with_workload(
    _admin: AdminUser,
    decorators: web::Data<DecoratorService>,
) -> Result<HttpResponse, ApiError> {
    let list = decorators.list_with_workload().await?;
    Ok(HttpResponse::Ok().json(list))
}

pub async fn promote_user(
    _admin: AdminUser,
    user_id: web::Path<String>,
    decorators: web::Data<DecoratorService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&user_id, "user")?;
    let profile = decorators.promote(&object_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn demote_user(
    _admin: AdminUser,
    user_id: web::Path<String>,
    decorators: web::Data<DecoratorService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&user_id, "user")?;
    let user = decorators.demote(&object_id).await?;
    Ok(HttpResponse::Ok().json(user))
}
