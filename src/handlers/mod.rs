use mongodb::bson::oid::ObjectId;

use crate::models::ApiError;

pub mod admin_handlers;
pub mod analytics_handlers;
pub mod booking_handlers;
pub mod decorator_handlers;
pub mod payment_handlers;
pub mod service_handlers;
pub mod user_handlers;

pub(crate) fn parse_object_id(id: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id)
        .map_err(|_| ApiError::ValidationError(format!("Invalid {} ID format", what)))
}

#[cfg(test)]
mod tests {
    use super::parse_object_id;

    #[test]
    fn test_parse_object_id_accepts_hex() {
        assert!(parse_object_id("507f1f77bcf86cd799439011", "booking").is_ok());
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        let err = parse_object_id("not-an-id", "service").unwrap_err();
        assert!(err.to_string().contains("service"));
    }
}
