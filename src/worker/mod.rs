//! Worker Lambda handler: confirmation emails and completed registrations

pub mod confirm;
pub mod email;
pub mod handler;

// Re-export the main handler for convenience
pub use handler::handler;
