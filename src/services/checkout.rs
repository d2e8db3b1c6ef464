use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use stripe::{CheckoutSessionId, CheckoutSessionMode, CheckoutSessionPaymentStatus, CreateCheckoutSession};

use crate::config::{AppConfig, ReconcileStrategy};
use crate::models::{ApiError, Booking, BookingStatus, CustomerInfo};
use crate::services::mongodb::PaymentWrite;
use crate::services::MongoDBService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    pub service_id: String,
    pub booking_date: String,
    pub location: String,
    pub customer_name: String,
    pub customer_email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub booking: Booking,
    pub already_processed: bool,
}

/// The booking slot a checkout session was opened for, recovered from the
/// session metadata during reconciliation.
#[derive(Debug)]
struct BookingSeed {
    service_id: String,
    booking_date: String,
    location: String,
    customer_name: String,
    customer_email: Option<String>,
}

pub struct CheckoutService {
    stripe_client: Arc<stripe::Client>,
    mongodb_service: Arc<MongoDBService>,
    frontend_url: String,
    strategy: ReconcileStrategy,
}

impl CheckoutService {
    pub fn new(
        stripe_client: Arc<stripe::Client>,
        mongodb_service: Arc<MongoDBService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            stripe_client,
            mongodb_service,
            frontend_url: config.frontend_url.clone(),
            strategy: config.reconciliation,
        }
    }

    /// Opens a hosted checkout session for a service. The charge amount is
    /// always read from the service document, never taken from the client.
    pub async fn create_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse, ApiError> {
        if request.customer_email.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "Customer email is required".to_string(),
            ));
        }
        let service_id = ObjectId::parse_str(&request.service_id)
            .map_err(|_| ApiError::ValidationError("Invalid service ID".to_string()))?;
        let service = self
            .mongodb_service
            .get_service_by_id(&service_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Service with id {} not found", request.service_id))
            })?;

        let amount_cents = amount_to_cents(service.cost);
        if amount_cents < 50 {
            return Err(ApiError::ValidationError(
                "Service cost is below the minimum chargeable amount".to_string(),
            ));
        }

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);

        // The placeholder is filled in by Stripe on redirect
        let success_url = format!(
            "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url
        );
        let cancel_url = format!("{}/services/{}", self.frontend_url, request.service_id);
        params.success_url = Some(&success_url);
        params.cancel_url = Some(&cancel_url);
        params.customer_email = Some(request.customer_email.as_str());

        let images = if service.image.trim().is_empty() {
            None
        } else {
            Some(vec![service.image.clone()])
        };
        params.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency: stripe::Currency::USD,
                product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: service.name.clone(),
                    description: Some(service.description.clone()),
                    images,
                    metadata: None,
                    tax_code: None,
                }),
                unit_amount: Some(amount_cents),
                recurring: None,
                tax_behavior: None,
                unit_amount_decimal: None,
                product: None,
            }),
            price: None,
            quantity: Some(1),
            adjustable_quantity: None,
            dynamic_tax_rates: None,
            tax_rates: None,
        }]);

        // Snapshot the booking slot so reconciliation can find or rebuild
        // the booking later without trusting anything the client resubmits.
        params.metadata = Some(
            [
                ("serviceId".to_string(), request.service_id.clone()),
                ("serviceName".to_string(), service.name.clone()),
                ("category".to_string(), service.category.clone()),
                ("unit".to_string(), service.unit.clone()),
                ("image".to_string(), service.image.clone()),
                ("bookingDate".to_string(), request.booking_date.clone()),
                ("location".to_string(), request.location.clone()),
                ("customerName".to_string(), request.customer_name.clone()),
                ("customerEmail".to_string(), request.customer_email.clone()),
            ]
            .into(),
        );

        match stripe::CheckoutSession::create(&self.stripe_client, params).await {
            Ok(session) => {
                info!("Created checkout session {} for service {}", session.id, request.service_id);
                Ok(CheckoutSessionResponse {
                    session_id: session.id.to_string(),
                    url: session.url.unwrap_or_default(),
                })
            }
            Err(e) => {
                error!("Failed to create checkout session: {}", e);
                Err(ApiError::StripeError(e.to_string()))
            }
        }
    }

    /// Confirms a payment against the checkout session the client came back
    /// with. The session object retrieved from Stripe is the only source of
    /// truth; nothing else from the client is trusted. Replays of the same
    /// session are answered with the booking recorded the first time.
    pub async fn reconcile(&self, session_id: &str) -> Result<ReconcileResponse, ApiError> {
        let session_id = CheckoutSessionId::from_str(session_id)
            .map_err(|_| ApiError::ValidationError("Invalid checkout session ID".to_string()))?;

        let session =
            match stripe::CheckoutSession::retrieve(&self.stripe_client, &session_id, &[]).await {
                Ok(session) => session,
                Err(e) => {
                    error!("Failed to retrieve checkout session {}: {}", session_id, e);
                    return Err(ApiError::StripeError(e.to_string()));
                }
            };

        if session.payment_status != CheckoutSessionPaymentStatus::Paid {
            return Err(ApiError::ValidationError(
                "Checkout session is not paid".to_string(),
            ));
        }

        // The payment-intent id is the idempotency key for the whole
        // reconciliation: one intent, one recorded payment.
        let transaction_id = session
            .payment_intent
            .as_ref()
            .map(|intent| intent.id().to_string())
            .ok_or_else(|| {
                ApiError::StripeError("Checkout session has no payment intent".to_string())
            })?;

        let empty = stripe::Metadata::new();
        let metadata = session.metadata.as_ref().unwrap_or(&empty);
        let seed = seed_from_metadata(metadata)?;
        let customer_email = seed
            .customer_email
            .clone()
            .or_else(|| {
                session
                    .customer_details
                    .as_ref()
                    .and_then(|details| details.email.clone())
            })
            .ok_or_else(|| {
                ApiError::ValidationError("Checkout session has no customer email".to_string())
            })?;

        let outcome = match self.strategy {
            ReconcileStrategy::CreateOnConfirm => {
                self.create_on_confirm(&session, &seed, &customer_email, &transaction_id)
                    .await?
            }
            ReconcileStrategy::ConfirmExisting => {
                self.mongodb_service
                    .confirm_booking_payment(
                        &seed.service_id,
                        &customer_email,
                        &seed.booking_date,
                        &seed.location,
                        &transaction_id,
                        session.amount_total.map(cents_to_amount),
                    )
                    .await?
            }
        };

        let (booking, already_processed) = outcome.into_parts();
        if already_processed {
            info!(
                "Payment intent {} already recorded, returning existing booking",
                transaction_id
            );
        } else {
            info!("Recorded payment intent {} for booking", transaction_id);
        }
        Ok(ReconcileResponse { booking, already_processed })
    }

    /// Builds the booking from the paid session and inserts it in one step.
    /// No unpaid placeholder row ever exists under this strategy.
    async fn create_on_confirm(
        &self,
        session: &stripe::CheckoutSession,
        seed: &BookingSeed,
        customer_email: &str,
        transaction_id: &str,
    ) -> Result<PaymentWrite, ApiError> {
        let service_id = ObjectId::parse_str(&seed.service_id).map_err(|_| {
            ApiError::ValidationError("Invalid service ID in session metadata".to_string())
        })?;
        let service = self
            .mongodb_service
            .get_service_by_id(&service_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(
                    "Service referenced by this checkout session no longer exists".to_string(),
                )
            })?;

        let price = session
            .amount_total
            .map(cents_to_amount)
            .unwrap_or(service.cost);

        let booking = Booking {
            id: None,
            service_id: seed.service_id.clone(),
            service_name: service.name,
            category: service.category,
            unit: service.unit,
            customer: CustomerInfo {
                name: seed.customer_name.clone(),
                email: customer_email.to_string(),
            },
            booking_date: seed.booking_date.clone(),
            location: seed.location.clone(),
            price,
            image: service.image,
            payment: true,
            transaction_id: Some(transaction_id.to_string()),
            payment_date: Some(bson::DateTime::now()),
            booking_status: BookingStatus::Pending,
            assigned_decorator: None,
            created_at: Utc::now(),
        };

        self.mongodb_service.insert_paid_booking(booking).await
    }
}

fn seed_from_metadata(metadata: &stripe::Metadata) -> Result<BookingSeed, ApiError> {
    Ok(BookingSeed {
        service_id: required_metadata(metadata, "serviceId")?,
        booking_date: required_metadata(metadata, "bookingDate")?,
        location: required_metadata(metadata, "location")?,
        customer_name: metadata.get("customerName").cloned().unwrap_or_default(),
        customer_email: metadata.get("customerEmail").cloned(),
    })
}

fn required_metadata(metadata: &stripe::Metadata, key: &str) -> Result<String, ApiError> {
    metadata
        .get(key)
        .cloned()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ApiError::ValidationError(format!("Checkout session metadata missing {}", key))
        })
}

fn amount_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> stripe::Metadata {
        [
            ("serviceId".to_string(), "64f0c2d5a1b2c3d4e5f60718".to_string()),
            ("bookingDate".to_string(), "2025-09-12".to_string()),
            ("location".to_string(), "Dhaka".to_string()),
            ("customerName".to_string(), "Amina".to_string()),
            ("customerEmail".to_string(), "amina@example.com".to_string()),
        ]
        .into()
    }

    #[test]
    fn test_seed_reads_all_metadata_fields() {
        let seed = seed_from_metadata(&sample_metadata()).unwrap();
        assert_eq!(seed.service_id, "64f0c2d5a1b2c3d4e5f60718");
        assert_eq!(seed.booking_date, "2025-09-12");
        assert_eq!(seed.location, "Dhaka");
        assert_eq!(seed.customer_name, "Amina");
        assert_eq!(seed.customer_email.as_deref(), Some("amina@example.com"));
    }

    #[test]
    fn test_seed_rejects_missing_slot_fields() {
        let mut metadata = sample_metadata();
        metadata.remove("bookingDate");
        assert!(seed_from_metadata(&metadata).is_err());

        let mut blank = sample_metadata();
        blank.insert("serviceId".to_string(), "  ".to_string());
        assert!(seed_from_metadata(&blank).is_err());
    }

    #[test]
    fn test_seed_tolerates_missing_optional_fields() {
        let mut metadata = sample_metadata();
        metadata.remove("customerName");
        metadata.remove("customerEmail");
        let seed = seed_from_metadata(&metadata).unwrap();
        assert_eq!(seed.customer_name, "");
        assert_eq!(seed.customer_email, None);
    }

    #[test]
    fn test_amount_conversions_round_trip() {
        assert_eq!(amount_to_cents(450.0), 45000);
        assert_eq!(amount_to_cents(19.99), 1999);
        assert_eq!(amount_to_cents(0.505), 51);
        assert_eq!(cents_to_amount(45000), 450.0);
        assert_eq!(cents_to_amount(1999), 19.99);
    }
}
