//! Daily credit allowance and its scheduled refill.

mod ledger;
mod scheduler;
pub mod handlers;

pub use ledger::{CreditLedger, CreditPolicy, CreditState};
pub use scheduler::ResetScheduler;
