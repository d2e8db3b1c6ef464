pub mod checkout;
mod decorator;
mod firebase_auth;
pub mod mongodb;

pub use checkout::CheckoutService;
pub use decorator::DecoratorService;
pub use firebase_auth::FirebaseAuth;
pub use mongodb::MongoDBService;