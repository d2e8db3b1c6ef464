use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AdminUser;
use crate::models::{ApiError, CreateServiceRequest, PagedServices, UpdateServiceRequest};
use crate::services::MongoDBService;
use crate::utils::Pagination;

use super::parse_object_id;

#[derive(Debug, Deserialize)]
pub struct ServiceFilterQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

pub async fn create_service(
    _admin: AdminUser,
    service_data: web::Json<CreateServiceRequest>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    info!("Creating service: {}", service_data.name);
    let service = db
        .create_service(service_data.into_inner().into_service())
        .await?;
    Ok(HttpResponse::Created().json(service))
}

pub async fn get_all_services(db: web::Data<MongoDBService>) -> Result<HttpResponse, ApiError> {
    let services = db.get_all_services().await?;
    Ok(HttpResponse::Ok().json(services))
}

pub async fn get_service(
    service_id: web::Path<String>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&service_id, "service")?;
    match db.get_service_by_id(&object_id).await? {
        Some(service) => Ok(HttpResponse::Ok().json(service)),
        None => Err(ApiError::NotFound(format!(
            "Service with id {} not found",
            service_id
        ))),
    }
}

pub async fn filter_services(
    query: web::Query<ServiceFilterQuery>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let page = Pagination::new(query.page, query.limit);
    let (services, total) = db
        .filter_services(
            query.search.as_deref(),
            query.category.as_deref(),
            query.sort.as_deref(),
            &page,
        )
        .await?;
    Ok(HttpResponse::Ok().json(PagedServices {
        services,
        total,
        page: page.page,
        total_pages: page.total_pages(total),
    }))
}

pub async fn update_service(
    _admin: AdminUser,
    service_id: web::Path<String>,
    update: web::Json<UpdateServiceRequest>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&service_id, "service")?;
    if db.update_service(&object_id, update.into_inner()).await? {
        info!("Updated service {}", service_id);
        Ok(HttpResponse::Ok().json(json!({ "message": "Service updated successfully" })))
    } else {
        Err(ApiError::NotFound(format!(
            "Service with id {} not found",
            service_id
        )))
    }
}

pub async fn delete_service(
    _admin: AdminUser,
    service_id: web::Path<String>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let object_id = parse_object_id(&service_id, "service")?;
    if db.delete_service(&object_id).await? {
        info!("Deleted service {}", service_id);
        Ok(HttpResponse::Ok().json(json!({ "message": "Service deleted successfully" })))
    } else {
        Err(ApiError::NotFound(format!(
            "Service with id {} not found",
            service_id
        )))
    }
}
