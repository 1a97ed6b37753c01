//! Configuration, pricing, request/record models and registration storage

pub mod config;
pub mod models;
pub mod pricing;
pub mod registrations;
