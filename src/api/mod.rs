//! API Lambda handler and request processing

pub mod blog;
pub mod checkout;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod payment;
pub mod sqs;
pub mod webhook;

// Re-export the main handler for convenience
pub use handler::{ApiContext, BlogSource, handler, route};
