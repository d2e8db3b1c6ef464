use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::models::{ApiError, UserRole};
use crate::services::{FirebaseAuth, MongoDBService};

/// Any signed-in user. Carries only the email proven by the ID token;
/// no role lookup is performed.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
}

/// A signed-in user whose stored role is `decorator`.
#[derive(Debug, Clone)]
pub struct DecoratorUser {
    pub email: String,
}

/// A signed-in user whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let email = verified_email(&req).await?;
            Ok(AuthenticatedUser { email })
        })
    }
}

impl FromRequest for DecoratorUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let email = require_role(&req, UserRole::Decorator).await?;
            Ok(DecoratorUser { email })
        })
    }
}

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let email = require_role(&req, UserRole::Admin).await?;
            Ok(AdminUser { email })
        })
    }
}

/// Verifies the bearer token on the request and returns the email it proves.
async fn verified_email(req: &HttpRequest) -> Result<String, ApiError> {
    let firebase = req.app_data::<web::Data<FirebaseAuth>>().ok_or_else(|| {
        ApiError::InternalError("Identity verifier is not configured".to_string())
    })?;

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Missing authorization header".to_string()))?;

    let token = bearer_token(header)
        .ok_or_else(|| ApiError::Unauthenticated("Malformed authorization header".to_string()))?;

    let claims = firebase.verify_id_token(token).await?;
    log::debug!("Verified token for uid {}", claims.sub);
    claims
        .email
        .ok_or_else(|| ApiError::Unauthenticated("Token carries no email".to_string()))
}

/// Authentication first, then authorization: the role is read fresh from
/// the users collection on every check.
async fn require_role(req: &HttpRequest, required: UserRole) -> Result<String, ApiError> {
    let email = verified_email(req).await?;

    let mongodb_service = req
        .app_data::<web::Data<MongoDBService>>()
        .ok_or_else(|| ApiError::InternalError("Database is not configured".to_string()))?;

    match mongodb_service.get_user_role(&email).await? {
        Some(role) if role == required => Ok(email),
        Some(role) => Err(ApiError::Forbidden {
            reason: format!("This action requires the {} role", required),
            role: role.to_string(),
        }),
        None => Err(ApiError::Forbidden {
            reason: format!("This action requires the {} role", required),
            role: "none".to_string(),
        }),
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_strips_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer  spaced "), Some("spaced"));
    }

    #[test]
    fn test_bearer_token_rejects_other_shapes() {
        assert_eq!(bearer_token("abc.def.ghi"), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }
}
