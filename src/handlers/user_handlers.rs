use actix_web::{web, HttpResponse};
use log::info;

use crate::auth::AuthenticatedUser;
use crate::models::{ApiError, RoleResponse, UpsertUserRequest};
use crate::services::MongoDBService;

/// Called by the frontend right after sign-in. Creates the user on first
/// contact, refreshes `last_login` afterwards.
pub async fn upsert_user(
    user_data: web::Json<UpsertUserRequest>,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    info!("Sign-in upsert for {}", user_data.email);
    let user = db.upsert_user(user_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn get_user_role(
    user: AuthenticatedUser,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    match db.get_user_role(&user.email).await? {
        Some(role) => Ok(HttpResponse::Ok().json(RoleResponse { role })),
        None => Err(ApiError::NotFound(format!(
            "No user record for {}",
            user.email
        ))),
    }
}
