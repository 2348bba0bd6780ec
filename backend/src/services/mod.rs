//! Business logic services
//!
//! Services encapsulate business logic and coordinate between the
//! authenticated caller and the stores.

pub mod blog;
pub mod personalization;
pub mod user;

pub use blog::BlogService;
pub use personalization::{PersonalizationService, Upsert};
pub use user::UserService;
