pub mod auth;
pub mod role;

pub use auth::{AuthGuard, SESSION_COOKIE};
pub use role::{AdminGuard, HouseholdGuard, WorkerGuard};
