/// lessonpay - checkout, webhook and blog listing backend for a driving school website.
///
/// This crate implements a two-Lambda architecture:
/// 1. An API Lambda that creates Stripe checkout sessions and payment intents,
///    serves the blog listing, and verifies Stripe webhooks before queuing work
/// 2. A Worker Lambda that sends confirmation emails and records completed
///    registrations
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - SQS for confirmation tasks between the Lambdas
/// - SES for confirmation emails
/// - reqwest for the Stripe REST API
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use lessonpay::core::config::AppConfig;
/// use lessonpay::core::pricing::Course;
/// use lessonpay::stripe::StripeClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     lessonpay::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let stripe = StripeClient::from_config(&config);
///
///     let params =
///         lessonpay::api::checkout::checkout_session_params(&config, Course::Bde, 1);
///     let session = stripe.create_checkout_session(&params).await?;
///     println!("client secret: {:?}", session.client_secret);
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod api;
pub mod blog;
pub mod core;
pub mod errors;
pub mod stripe;
pub mod worker;

pub use errors::CheckoutError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration, filtered by `RUST_LOG` (default `info`). It
/// should be called once at the start of each Lambda binary; later calls are
/// no-ops.
///
/// # Example
///
/// ```
/// lessonpay::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
