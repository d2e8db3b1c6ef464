pub mod analytics;
pub mod booking;
pub mod decorator;
pub mod error;
pub mod service;
pub mod user;

pub use analytics::{AnalyticsSummary, BookingTotals, ServiceDemand, StatusCount};
pub use booking::{
    AssignDecoratorRequest, Booking, BookingStatus, CreateBookingRequest, CustomerInfo,
    DecoratorRef, PagedBookings, UpdateStatusRequest,
};
pub use decorator::{DecoratorProfile, DecoratorWorkload, EarningsSummary};
pub use error::{ApiError, ErrorResponse};
pub use service::{CreateServiceRequest, PagedServices, Service, UpdateServiceRequest};
pub use user::{RoleResponse, UpsertUserRequest, User, UserRole};
