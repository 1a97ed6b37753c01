use std::env;
use std::path::PathBuf;

use url::Url;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_SITE_DOMAIN: &str = "http://localhost:4242";
/// Lambda only allows writes under `/tmp`.
pub const DEFAULT_REGISTRATIONS_DIR: &str = "/tmp/registrations";
pub const DEFAULT_BUSINESS_NAME: &str = "Rajput Driving School Windsor";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    /// Origin used to build the checkout `return_url`, without a trailing slash.
    pub site_domain: String,
    pub confirmation_queue_url: Option<String>,
    pub registrations_dir: PathBuf,
    pub business_name: String,
    pub mail_from: Option<String>,
    pub business_bcc: Option<String>,
    pub blog_index_path: Option<PathBuf>,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error naming the variable when a required one is unset or
    /// `SITE_DOMAIN` is not an absolute URL.
    pub fn from_env() -> Result<Self, String> {
        let site_domain =
            env::var("SITE_DOMAIN").unwrap_or_else(|_| DEFAULT_SITE_DOMAIN.to_string());

        Ok(Self {
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .map_err(|e| format!("STRIPE_SECRET_KEY: {}", e))?,
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .map_err(|e| format!("STRIPE_WEBHOOK_SECRET: {}", e))?,
            stripe_api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string()),
            site_domain: normalize_site_domain(&site_domain)?,
            confirmation_queue_url: non_empty_var("CONFIRMATION_QUEUE_URL"),
            registrations_dir: non_empty_var("REGISTRATIONS_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_REGISTRATIONS_DIR), PathBuf::from),
            business_name: non_empty_var("BUSINESS_NAME")
                .unwrap_or_else(|| DEFAULT_BUSINESS_NAME.to_string()),
            mail_from: non_empty_var("MAIL_FROM"),
            business_bcc: non_empty_var("BUSINESS_BCC"),
            blog_index_path: non_empty_var("BLOG_INDEX_PATH").map(PathBuf::from),
        })
    }

    /// Return URL handed to Stripe; the `{CHECKOUT_SESSION_ID}` placeholder is
    /// substituted by Stripe, so it must stay unescaped.
    #[must_use]
    pub fn checkout_return_url(&self) -> String {
        format!(
            "{}/complete.html?session_id={{CHECKOUT_SESSION_ID}}",
            self.site_domain
        )
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// # Errors
///
/// Returns an error if `raw` is not an absolute http(s) URL.
pub fn normalize_site_domain(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("SITE_DOMAIN: {}", e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("SITE_DOMAIN: unsupported scheme '{}'", url.scheme()));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
