use std::env;
use std::str::FromStr;

/// How a confirmed payment is written back to the bookings collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Build the booking from the paid session and insert it in one step.
    CreateOnConfirm,
    /// Flip the payment flag on a booking created before checkout.
    ConfirmExisting,
}

impl FromStr for ReconcileStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_on_confirm" => Ok(ReconcileStrategy::CreateOnConfirm),
            "confirm_existing" => Ok(ReconcileStrategy::ConfirmExisting),
            other => Err(format!(
                "Invalid reconciliation strategy '{}', expected create_on_confirm or confirm_existing",
                other
            )),
        }
    }
}

/// Whether direct booking creation rejects a second unpaid hold on the same
/// service, customer, date and location slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Allow,
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(DuplicatePolicy::Allow),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!(
                "Invalid duplicate policy '{}', expected allow or reject",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub mongodb_uri: String,
    pub database: String,
    pub stripe_secret_key: String,
    pub firebase_project_id: String,
    pub frontend_url: String,
    pub reconciliation: ReconcileStrategy,
    pub duplicate_policy: DuplicatePolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mongodb_uri = require_env("MONGODB_URI")?;
        let stripe_secret_key = require_env("STRIPE_SECRET_KEY")?;
        let firebase_project_id = require_env("FIREBASE_PROJECT_ID")?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let database = env::var("DATABASE_NAME").unwrap_or_else(|_| "styleDecor".to_string());
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let reconciliation = env::var("PAYMENT_RECONCILIATION")
            .unwrap_or_else(|_| "create_on_confirm".to_string())
            .parse::<ReconcileStrategy>()?;
        let duplicate_policy = env::var("BOOKING_DUPLICATE_POLICY")
            .unwrap_or_else(|_| "allow".to_string())
            .parse::<DuplicatePolicy>()?;

        Ok(AppConfig {
            host,
            port,
            log_level,
            mongodb_uri,
            database,
            stripe_secret_key,
            firebase_project_id,
            frontend_url,
            reconciliation,
            duplicate_policy,
        })
    }
}

fn require_env(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{} must be set", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_strategy_parses_known_values() {
        assert_eq!(
            "create_on_confirm".parse::<ReconcileStrategy>().unwrap(),
            ReconcileStrategy::CreateOnConfirm
        );
        assert_eq!(
            "confirm_existing".parse::<ReconcileStrategy>().unwrap(),
            ReconcileStrategy::ConfirmExisting
        );
        assert!("both".parse::<ReconcileStrategy>().is_err());
        assert!("".parse::<ReconcileStrategy>().is_err());
    }

    #[test]
    fn test_duplicate_policy_parses_known_values() {
        assert_eq!("allow".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Allow);
        assert_eq!("reject".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Reject);
        assert!("maybe".parse::<DuplicatePolicy>().is_err());
    }
}
