use actix_web::{web, HttpResponse};
use log::info;

use crate::auth::AuthenticatedUser;
use crate::models::ApiError;
use crate::services::checkout::{CreateCheckoutSessionRequest, PaymentSuccessRequest};
use crate::services::{CheckoutService, MongoDBService};

pub async fn create_checkout_session(
    request: web::Json<CreateCheckoutSessionRequest>,
    checkout: web::Data<CheckoutService>,
) -> Result<HttpResponse, ApiError> {
    info!(
        "Creating checkout session for {} (service {})",
        request.customer_email, request.service_id
    );
    let response = checkout.create_session(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Reconciles a completed checkout session. Safe to call more than once for
/// the same session; replays answer 200 instead of 201.
pub async fn payment_success(
    request: web::Json<PaymentSuccessRequest>,
    checkout: web::Data<CheckoutService>,
) -> Result<HttpResponse, ApiError> {
    let response = checkout.reconcile(&request.session_id).await?;
    if response.already_processed {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::Created().json(response))
    }
}

pub async fn get_payment_history(
    user: AuthenticatedUser,
    db: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let history = db.get_payment_history(&user.email).await?;
    Ok(HttpResponse::Ok().json(history))
}
