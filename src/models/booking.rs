use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_booking_status() -> BookingStatus {
    BookingStatus::Pending
}

/// Lifecycle of a booking. Forward movement walks the progression one step
/// at a time; `cancelled` is reachable from any non-terminal status.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "assigned")]
    Assigned,
    #[serde(rename = "planning_phase")]
    PlanningPhase,
    #[serde(rename = "materials_prepared")]
    MaterialsPrepared,
    #[serde(rename = "on_the_way")]
    OnTheWay,
    #[serde(rename = "setup_in_progress")]
    SetupInProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    /// Statuses that count as active work for a decorator.
    pub const WORKING: [BookingStatus; 5] = [
        BookingStatus::Assigned,
        BookingStatus::PlanningPhase,
        BookingStatus::MaterialsPrepared,
        BookingStatus::OnTheWay,
        BookingStatus::SetupInProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Assigned => "assigned",
            BookingStatus::PlanningPhase => "planning_phase",
            BookingStatus::MaterialsPrepared => "materials_prepared",
            BookingStatus::OnTheWay => "on_the_way",
            BookingStatus::SetupInProgress => "setup_in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// The next status in the forward progression, if any.
    pub fn next_in_progression(&self) -> Option<BookingStatus> {
        match self {
            BookingStatus::Pending => Some(BookingStatus::Assigned),
            BookingStatus::Assigned => Some(BookingStatus::PlanningPhase),
            BookingStatus::PlanningPhase => Some(BookingStatus::MaterialsPrepared),
            BookingStatus::MaterialsPrepared => Some(BookingStatus::OnTheWay),
            BookingStatus::OnTheWay => Some(BookingStatus::SetupInProgress),
            BookingStatus::SetupInProgress => Some(BookingStatus::Completed),
            BookingStatus::Completed | BookingStatus::Cancelled => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition. Forward
    /// moves advance exactly one step; skipping ahead or moving backwards
    /// is rejected, as is leaving a terminal status.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        if next == BookingStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next_in_progression() == Some(next)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
}

/// Snapshot of the decorator assigned to a booking. Matched by email when
/// listing a decorator's projects, so no hard reference to the users
/// collection is kept.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorRef {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Hex id of the booked service. Kept as a plain string: the service
    /// document may be deleted later without breaking the booking snapshot.
    pub service_id: String,
    pub service_name: String,
    pub category: String,
    pub unit: String,
    pub customer: CustomerInfo,
    pub booking_date: String,
    pub location: String,
    pub price: f64,
    pub image: String,
    #[serde(default)]
    pub payment: bool,
    /// Payment-intent id recorded when the payment is reconciled. Absent
    /// until then, which keeps the unique sparse index out of the way for
    /// unpaid bookings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<bson::DateTime>,
    #[serde(default = "default_booking_status")]
    pub booking_status: BookingStatus,
    #[serde(default)]
    pub assigned_decorator: Option<DecoratorRef>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub service_name: String,
    pub category: String,
    pub unit: String,
    pub customer: CustomerInfo,
    pub booking_date: String,
    pub location: String,
    pub price: f64,
    pub image: String,
    #[serde(default)]
    pub payment: bool,
}

impl CreateBookingRequest {
    pub fn into_booking(self) -> Booking {
        Booking {
            id: None,
            service_id: self.service_id,
            service_name: self.service_name,
            category: self.category,
            unit: self.unit,
            customer: self.customer,
            booking_date: self.booking_date,
            location: self.location,
            price: self.price,
            image: self.image,
            payment: self.payment,
            transaction_id: None,
            payment_date: None,
            booking_status: BookingStatus::Pending,
            assigned_decorator: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignDecoratorRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedBookings {
    pub bookings: Vec<Booking>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let pairs = [
            (BookingStatus::Pending, "\"pending\""),
            (BookingStatus::Assigned, "\"assigned\""),
            (BookingStatus::PlanningPhase, "\"planning_phase\""),
            (BookingStatus::MaterialsPrepared, "\"materials_prepared\""),
            (BookingStatus::OnTheWay, "\"on_the_way\""),
            (BookingStatus::SetupInProgress, "\"setup_in_progress\""),
            (BookingStatus::Completed, "\"completed\""),
            (BookingStatus::Cancelled, "\"cancelled\""),
        ];
        for (status, wire) in pairs {
            assert_eq!(serde_json::to_string(&status).unwrap(), wire);
            let parsed: BookingStatus = serde_json::from_str(wire).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(serde_json::from_str::<BookingStatus>("\"finished\"").is_err());
        assert!(serde_json::from_str::<BookingStatus>("\"Pending\"").is_err());
        assert!(serde_json::from_str::<BookingStatus>("\"\"").is_err());
    }

    #[test]
    fn test_forward_progression_advances_one_step() {
        let chain = [
            BookingStatus::Pending,
            BookingStatus::Assigned,
            BookingStatus::PlanningPhase,
            BookingStatus::MaterialsPrepared,
            BookingStatus::OnTheWay,
            BookingStatus::SetupInProgress,
            BookingStatus::Completed,
        ];
        for pair in chain.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} should advance to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_no_skipping_or_backwards_moves() {
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::PlanningPhase));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Assigned.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::OnTheWay.can_transition_to(BookingStatus::PlanningPhase));
    }

    #[test]
    fn test_cancel_allowed_from_any_non_terminal_status() {
        let cancellable = [
            BookingStatus::Pending,
            BookingStatus::Assigned,
            BookingStatus::PlanningPhase,
            BookingStatus::MaterialsPrepared,
            BookingStatus::OnTheWay,
            BookingStatus::SetupInProgress,
        ];
        for status in cancellable {
            assert!(status.can_transition_to(BookingStatus::Cancelled), "{} should be cancellable", status);
        }
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_terminal_statuses_have_no_successor() {
        assert_eq!(BookingStatus::Completed.next_in_progression(), None);
        assert_eq!(BookingStatus::Cancelled.next_in_progression(), None);
    }

    #[test]
    fn test_working_bucket_membership() {
        assert!(BookingStatus::WORKING.contains(&BookingStatus::Assigned));
        assert!(BookingStatus::WORKING.contains(&BookingStatus::SetupInProgress));
        assert!(!BookingStatus::WORKING.contains(&BookingStatus::Pending));
        assert!(!BookingStatus::WORKING.contains(&BookingStatus::Completed));
        assert!(!BookingStatus::WORKING.contains(&BookingStatus::Cancelled));
    }

    #[test]
    fn test_booking_serializes_with_camel_case_keys() {
        let booking = CreateBookingRequest {
            service_id: "64f0c2d5a1b2c3d4e5f60718".to_string(),
            service_name: "Wedding Stage".to_string(),
            category: "wedding".to_string(),
            unit: "per event".to_string(),
            customer: CustomerInfo {
                name: "Amina".to_string(),
                email: "amina@example.com".to_string(),
            },
            booking_date: "2025-09-12".to_string(),
            location: "Dhaka".to_string(),
            price: 450.0,
            image: "https://img.example.com/stage.jpg".to_string(),
            payment: false,
        }
        .into_booking();

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["serviceId"], "64f0c2d5a1b2c3d4e5f60718");
        assert_eq!(value["bookingStatus"], "pending");
        assert_eq!(value["customer"]["email"], "amina@example.com");
        // Unset payment fields stay absent so the sparse index ignores them.
        assert!(value.get("transactionId").is_none());
        assert!(value.get("paymentDate").is_none());
    }
}
