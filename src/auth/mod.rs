//! Session handling for the Genora dashboard
//!
//! Accounts are mocked: a single user record lives in local storage and
//! any password is accepted.

pub mod handlers;
mod models;
mod session;

pub use models::{SessionSnapshot, User, UserPatch};
pub use session::SessionStore;
