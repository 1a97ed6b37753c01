//! Stripe REST API: client, form encoding, wire types and webhook signatures

pub mod client;
pub mod form;
pub mod types;
pub mod webhook;

pub use client::StripeClient;
pub use types::{CheckoutSession, Event, PaymentIntent};
