//! Contract lifecycle and settlement engine.
//!
//! Services drive the contract state machine (milestone submission, review,
//! payment recording, dispute tickets), and two scheduled sweeps settle
//! finished work: the payout settlement job releases contracts at 100%
//! completion, the ticket sweep closes expired disputes with a split payout.

pub mod config;
pub mod gateway;
pub mod scheduler;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::*;
pub use scheduler::*;
pub use service::*;
