use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::models::ApiError;

/// Google's JWKS endpoint for Firebase ID token signing keys
const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Firebase issuer URL prefix (completed with the project ID)
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Minimum cache TTL in seconds (5 minutes)
const MIN_CACHE_TTL_SECS: i64 = 300;

/// Default cache TTL in seconds if the Cache-Control header is missing (1 hour)
const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

/// Claims carried by a verified Firebase ID token. Expiry, issuer and
/// audience are validated during decoding; only the claims the application
/// reads afterwards are kept here.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseClaims {
    /// Firebase user UID
    pub sub: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    kid: Option<String>,
    /// RSA modulus (base64url encoded)
    n: Option<String>,
    /// RSA exponent (base64url encoded)
    e: Option<String>,
}

struct CachedKeys {
    /// Key ID to decoding key mapping
    keys: HashMap<String, DecodingKey>,
    expires_at: DateTime<Utc>,
}

/// Verifies Firebase ID tokens against Google's published signing keys.
/// Keys are cached for the duration advertised by the Cache-Control header.
pub struct FirebaseAuth {
    project_id: String,
    http_client: Client,
    cached_keys: RwLock<Option<CachedKeys>>,
}

impl FirebaseAuth {
    pub fn new(project_id: String) -> Self {
        Self {
            project_id,
            http_client: Client::new(),
            cached_keys: RwLock::new(None),
        }
    }

    /// Verifies signature, issuer, audience and expiry of a Firebase ID
    /// token and returns its claims.
    pub async fn verify_id_token(&self, token: &str) -> Result<FirebaseClaims, ApiError> {
        let header = decode_header(token).map_err(|e| {
            log::debug!("Failed to decode token header: {}", e);
            ApiError::Unauthenticated("Invalid token format".to_string())
        })?;

        let kid = header
            .kid
            .ok_or_else(|| ApiError::Unauthenticated("Token missing key id".to_string()))?;

        let decoding_key = self.get_signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)]);

        let token_data =
            decode::<FirebaseClaims>(token, &decoding_key, &validation).map_err(|e| {
                log::debug!("Token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        ApiError::Unauthenticated("Token expired".to_string())
                    }
                    ErrorKind::InvalidAudience => {
                        ApiError::Unauthenticated("Invalid token audience".to_string())
                    }
                    ErrorKind::InvalidIssuer => {
                        ApiError::Unauthenticated("Invalid token issuer".to_string())
                    }
                    _ => ApiError::Unauthenticated("Invalid token".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Returns the signing key for a key ID, refreshing the cache from
    /// Google when it is missing or expired.
    async fn get_signing_key(&self, kid: &str) -> Result<DecodingKey, ApiError> {
        if let Some(key) = self.try_cached_key(kid).await {
            return Ok(key);
        }

        self.refresh_keys().await?;

        let cache = self.cached_keys.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or_else(|| {
                log::debug!("No Firebase signing key for kid {}", kid);
                ApiError::Unauthenticated("Unknown token signing key".to_string())
            })
    }

    async fn try_cached_key(&self, kid: &str) -> Option<DecodingKey> {
        let cache = self.cached_keys.read().await;
        cache.as_ref().and_then(|cached| {
            if cached.expires_at > Utc::now() {
                cached.keys.get(kid).cloned()
            } else {
                None
            }
        })
    }

    async fn refresh_keys(&self) -> Result<(), ApiError> {
        log::info!("Fetching Firebase signing keys from Google");

        let response = self
            .http_client
            .get(FIREBASE_JWKS_URL)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to fetch Firebase signing keys: {}", e);
                ApiError::InternalError(format!("Failed to fetch Firebase signing keys: {}", e))
            })?;

        let cache_ttl = response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_CACHE_TTL_SECS)
            .max(MIN_CACHE_TTL_SECS);

        let jwk_set: JwkSet = response.json().await.map_err(|e| {
            log::error!("Failed to parse Firebase signing keys: {}", e);
            ApiError::InternalError(format!("Failed to parse Firebase signing keys: {}", e))
        })?;

        let mut keys = HashMap::with_capacity(jwk_set.keys.len());
        for jwk in &jwk_set.keys {
            if let (Some(kid), Some(key)) = (&jwk.kid, jwk_to_decoding_key(jwk)) {
                keys.insert(kid.clone(), key);
            }
        }

        if keys.is_empty() {
            return Err(ApiError::InternalError(
                "No usable Firebase signing keys found".to_string(),
            ));
        }

        let expires_at = Utc::now() + Duration::seconds(cache_ttl);
        log::info!(
            "Cached {} Firebase signing keys for {}s",
            keys.len(),
            cache_ttl
        );

        let mut cache = self.cached_keys.write().await;
        *cache = Some(CachedKeys { keys, expires_at });
        Ok(())
    }
}

fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    if jwk.kty != "RSA" {
        return None;
    }
    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;
    DecodingKey::from_rsa_components(n, e).ok()
}

/// Parse max-age value from a Cache-Control header
///
/// Example: "public, max-age=3600, must-revalidate" -> 3600
fn parse_max_age(cache_control: &str) -> Option<i64> {
    cache_control
        .split(',')
        .map(str::trim)
        .find_map(|s| s.strip_prefix("max-age="))
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_age() {
        assert_eq!(parse_max_age("public, max-age=3600, must-revalidate"), Some(3600));
        assert_eq!(parse_max_age("max-age=19008"), Some(19008));
        assert_eq!(parse_max_age("no-cache"), None);
        assert_eq!(parse_max_age("max-age=abc"), None);
        assert_eq!(parse_max_age(""), None);
    }

    #[test]
    fn test_non_rsa_jwk_is_skipped() {
        let jwk = Jwk {
            kty: "EC".to_string(),
            kid: Some("key-1".to_string()),
            n: Some("abc".to_string()),
            e: Some("AQAB".to_string()),
        };
        assert!(jwk_to_decoding_key(&jwk).is_none());
    }

    #[test]
    fn test_jwk_without_components_is_skipped() {
        let jwk = Jwk {
            kty: "RSA".to_string(),
            kid: Some("key-1".to_string()),
            n: None,
            e: None,
        };
        assert!(jwk_to_decoding_key(&jwk).is_none());
    }
}
