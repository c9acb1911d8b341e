//! Domain documents stored in the back-office collections.

pub mod booking;
pub mod credential;
pub mod customer;
pub mod itinerary;
pub mod user;

pub use booking::Booking;
pub use credential::{ApiCredential, ProviderKind};
pub use customer::{Customer, CustomerDocument};
pub use itinerary::{Collateral, CoverImage, DayPlan, Itinerary};
pub use user::{User, UserView};
