use serde::{Deserialize, Serialize};

use crate::models::booking::BookingStatus;

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_bookings: i64,
    pub paid_bookings: i64,
    pub total_revenue: f64,
    pub completed_bookings: i64,
    pub working_bookings: i64,
    pub cancelled_bookings: i64,
    pub total_users: u64,
    pub total_services: u64,
    pub total_decorators: u64,
}

/// Per-booking totals produced by a single aggregation pass over the
/// bookings collection. Collection-level counts are filled in separately.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingTotals {
    #[serde(default)]
    pub total_bookings: i64,
    #[serde(default)]
    pub paid_bookings: i64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub completed_bookings: i64,
    #[serde(default)]
    pub working_bookings: i64,
    #[serde(default)]
    pub cancelled_bookings: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDemand {
    pub service_name: String,
    pub bookings: i64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: BookingStatus,
    pub count: i64,
}
