//! API Lambda handler - thin router that delegates to specialized handlers.
//!
//! This module handles:
//! - Request extraction (method, path, query, headers, body)
//! - Checkout routes (delegated to `checkout` and `payment`)
//! - Stripe webhooks (delegated to `webhook`)
//! - Blog listing (delegated to `blog`)

use std::path::PathBuf;
use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use super::parsing::ApiRequest;
use super::sqs::{ConfirmationQueue, SqsConfirmationQueue};
use super::{blog, checkout, helpers, payment, webhook};
use crate::blog::{BlogIndex, BlogParams};
use crate::core::config::AppConfig;
use crate::core::registrations::{FileRegistrationStore, RegistrationStore};
use crate::stripe::StripeClient;

/// Where the blog listing comes from.
pub enum BlogSource {
    Disabled,
    /// JSON index read on the first `/blog/posts` request and kept for the
    /// life of the process.
    File(PathBuf),
    Loaded(Arc<BlogIndex>),
}

static BLOG_INDEX: OnceCell<Option<Arc<BlogIndex>>> = OnceCell::const_new();

impl BlogSource {
    /// The index, or `None` when the blog is disabled or failed to load.
    pub async fn index(&self) -> Option<Arc<BlogIndex>> {
        match self {
            Self::Disabled => None,
            Self::Loaded(index) => Some(Arc::clone(index)),
            Self::File(path) => BLOG_INDEX
                .get_or_init(|| async {
                    match BlogIndex::load(path).await {
                        Ok(index) => Some(Arc::new(index)),
                        Err(e) => {
                            warn!("Blog index unavailable: {}", e);
                            None
                        }
                    }
                })
                .await
                .clone(),
        }
    }
}

/// Everything a request needs, built once per invocation.
pub struct ApiContext {
    pub config: AppConfig,
    pub stripe: StripeClient,
    pub store: Arc<dyn RegistrationStore>,
    pub queue: Arc<dyn ConfirmationQueue>,
    pub blog: BlogSource,
}

impl ApiContext {
    /// Production wiring: Stripe over HTTPS, file registrations, SQS queue.
    #[must_use]
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            stripe: StripeClient::from_config(&config),
            store: Arc::new(FileRegistrationStore::new(config.registrations_dir.clone())),
            queue: Arc::new(SqsConfirmationQueue::from_config(&config)),
            blog: config
                .blog_index_path
                .clone()
                .map_or(BlogSource::Disabled, BlogSource::File),
            config,
        }
    }
}

pub use self::function_handler as handler;

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Returns an error only when configuration is missing; request failures are
/// returned as error responses.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<impl Serialize, Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    let ctx = ApiContext::from_config(config);

    let request = match ApiRequest::from_event(&event.payload) {
        Ok(request) => request,
        Err(e) => {
            error!("Unreadable request: {}", e);
            return Ok(helpers::err_response(400, "Invalid request"));
        }
    };

    Ok(route(&ctx, &request).await)
}

/// Dispatches on the last path segment(s) so stage prefixes such as
/// `/prod` do not matter.
pub async fn route(ctx: &ApiContext, request: &ApiRequest) -> Value {
    let path = request.route_path();
    let method = request.method.as_str();
    info!(method = %method, path = %path, "API request");

    if path.ends_with("/create-checkout-session") {
        if method != "POST" {
            return helpers::method_not_allowed();
        }
        return checkout::create_checkout_session(
            &ctx.config,
            &ctx.stripe,
            request.body.as_deref(),
        )
        .await;
    }

    if path.ends_with("/session-status") {
        if method != "GET" {
            return helpers::method_not_allowed();
        }
        return checkout::session_status(&ctx.stripe, &request.query).await;
    }

    if path.ends_with("/create-payment-intent") {
        if method != "POST" {
            return helpers::method_not_allowed();
        }
        return payment::create_payment_intent(
            &ctx.stripe,
            ctx.store.as_ref(),
            &ctx.config.business_name,
            request.body.as_deref(),
        )
        .await;
    }

    if path.ends_with("/webhook") {
        if method != "POST" {
            return helpers::method_not_allowed();
        }
        return webhook::handle_webhook(
            request,
            &ctx.config.stripe_webhook_secret,
            ctx.queue.as_ref(),
            ctx.store.as_ref(),
        )
        .await;
    }

    if path.ends_with("/blog/posts") {
        if method != "GET" {
            return helpers::method_not_allowed();
        }
        let params = BlogParams::from_query(&request.query);
        let index = ctx.blog.index().await;
        return blog::handle_blog_posts(index.as_deref(), &params);
    }

    warn!(path = %path, "No route");
    helpers::not_found()
}
