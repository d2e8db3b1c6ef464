use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

fn default_decorator_role() -> UserRole {
    UserRole::Decorator
}

/// Projection of a decorator user kept in its own collection for fast public
/// listing. Written and removed inside the same transaction that flips the
/// user's role, so the two collections never disagree.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_decorator_role")]
    pub role: UserRole,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorWorkload {
    #[serde(flatten)]
    pub profile: DecoratorProfile,
    pub working_projects: u64,
    pub completed_projects: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub completed_projects: i64,
    #[serde(default)]
    pub working_projects: i64,
}
