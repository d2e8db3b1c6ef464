use std::sync::Arc;

use log::info;
use mongodb::bson::oid::ObjectId;

use crate::models::{
    ApiError, BookingStatus, DecoratorProfile, DecoratorWorkload, EarningsSummary, User,
};

use super::MongoDBService;

/// Manages the decorator side of the marketplace: promotion and demotion of
/// users, the public decorator directory, and per-decorator workload and
/// earnings figures.
pub struct DecoratorService {
    mongodb_service: Arc<MongoDBService>,
}

impl DecoratorService {
    pub fn new(mongodb_service: Arc<MongoDBService>) -> Self {
        Self { mongodb_service }
    }

    pub async fn promote(&self, user_id: &ObjectId) -> Result<DecoratorProfile, ApiError> {
        let profile = self.mongodb_service.promote_to_decorator(user_id).await?;
        info!("Promoted user {} to decorator", user_id);
        Ok(profile)
    }

    pub async fn demote(&self, user_id: &ObjectId) -> Result<User, ApiError> {
        let user = self.mongodb_service.demote_to_customer(user_id).await?;
        info!("Demoted user {} back to customer", user_id);
        Ok(user)
    }

    /// All decorator profiles, for the public directory.
    pub async fn list_profiles(&self) -> Result<Vec<DecoratorProfile>, ApiError> {
        self.mongodb_service.get_decorator_profiles().await
    }

    /// Decorator profiles enriched with live booking counts. One counting
    /// round trip per decorator and status bucket; acceptable at directory
    /// sizes, revisit if the roster grows past a few hundred.
    pub async fn list_with_workload(&self) -> Result<Vec<DecoratorWorkload>, ApiError> {
        let profiles = self.mongodb_service.get_decorator_profiles().await?;
        let mut out = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let working = self
                .mongodb_service
                .count_decorator_bookings(&profile.email, &BookingStatus::WORKING)
                .await?;
            let completed = self
                .mongodb_service
                .count_decorator_bookings(&profile.email, &[BookingStatus::Completed])
                .await?;
            out.push(DecoratorWorkload {
                profile,
                working_projects: working,
                completed_projects: completed,
            });
        }
        Ok(out)
    }

    pub async fn earnings(&self, email: &str) -> Result<EarningsSummary, ApiError> {
        self.mongodb_service.get_decorator_earnings(email).await
    }
}
