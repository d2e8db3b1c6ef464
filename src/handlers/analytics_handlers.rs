use actix_web::{web, HttpResponse};

use crate::auth::AdminUser;
use crate::models::ApiError;
use crate::services::MongoDBService;

pub async fn get_summary(
    _admin: AdminUser,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let summary = db.get_analytics_summary().await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn get_service_demand(
    _admin: AdminUser,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let demand = db.get_service_demand().await?;
    Ok(HttpResponse::Ok().json(demand))
}

pub async fn get_status_distribution(
    _admin: AdminUser,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let distribution = db.get_status_distribution().await?;
    Ok(HttpResponse::Ok().json(distribution))
}
