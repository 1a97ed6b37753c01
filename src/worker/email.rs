//! Confirmation email composition and delivery through SES.

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use chrono::DateTime;
use chrono_tz::America::Toronto;
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::pricing::{Course, format_dollars};
use crate::errors::CheckoutError;
use crate::stripe::types::PaymentIntent;

const TEXT_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub business_name: String,
    pub from: Option<String>,
    pub bcc: Option<String>,
}

impl MailSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            business_name: config.business_name.clone(),
            from: config.mail_from.clone(),
            bcc: config.business_bcc.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEmail {
    pub from: String,
    pub to: String,
    pub bcc: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ConfirmationEmail) -> Result<(), CheckoutError>;
}

/// `March 5, 2025 at 2:07 PM`, in the school's local time.
#[must_use]
pub fn format_payment_date(created: i64) -> String {
    DateTime::from_timestamp(created, 0).map_or_else(
        || "Unknown date".to_string(),
        |utc| {
            utc.with_timezone(&Toronto)
                .format("%B %-d, %Y at %-I:%M %p")
                .to_string()
        },
    )
}

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Recipient from metadata, else the receipt email Stripe recorded.
#[must_use]
pub fn recipient(intent: &PaymentIntent) -> Option<&str> {
    intent
        .metadata
        .get("student_email")
        .map(String::as_str)
        .or(intent.receipt_email.as_deref())
        .map(str::trim)
        .filter(|e| !e.is_empty())
}

/// Builds the confirmation for `intent`, or `None` when there is no sender
/// configured or no address to send to.
#[must_use]
pub fn build_confirmation_email(
    intent: &PaymentIntent,
    settings: &MailSettings,
) -> Option<ConfirmationEmail> {
    let from = settings.from.as_deref()?;
    let to_address = recipient(intent)?;

    let student_name = intent
        .metadata
        .get("student_name")
        .map(|n| n.trim())
        .filter(|n| !n.is_empty());
    let course_name = intent
        .metadata
        .get("course")
        .and_then(|code| Course::parse(code))
        .map_or_else(
            || intent.description.clone().unwrap_or_else(|| "Driving course".to_string()),
            |course| course.long_name().to_string(),
        );
    let amount = format_dollars(intent.amount);
    let paid_on = format_payment_date(intent.created);

    let html = format!(
        "<html><body>\
         <h1>Registration Confirmed!</h1>\
         <p>Dear {name},</p>\
         <p>Thank you for registering with <strong>{business}</strong>.</p>\
         <table>\
         <tr><th>Course:</th><td>{course}</td></tr>\
         <tr><th>Amount Paid:</th><td>CAD ${amount}</td></tr>\
         <tr><th>Payment Date:</th><td>{paid_on}</td></tr>\
         <tr><th>Payment ID:</th><td>{payment_id}</td></tr>\
         </table>\
         <p>Our team will contact you within 24-48 hours to schedule your lessons.</p>\
         <p>This is an automated confirmation email. Please do not reply to this email.</p>\
         </body></html>",
        name = escape_html(student_name.unwrap_or("Student")),
        business = escape_html(&settings.business_name),
        course = escape_html(&course_name),
        payment_id = escape_html(&intent.id),
    );
    let text = match html2text::from_read(html.as_bytes(), TEXT_WIDTH) {
        Ok(text) => text,
        Err(e) => {
            warn!("Plain-text rendering failed: {}", e);
            format!("Registration confirmed: {course_name}, CAD ${amount}, payment {}", intent.id)
        }
    };

    let to = match student_name {
        Some(name) => format!("\"{}\" <{}>", name.replace('"', ""), to_address),
        None => to_address.to_string(),
    };

    Some(ConfirmationEmail {
        from: format!("\"{}\" <{}>", settings.business_name.replace('"', ""), from),
        to,
        bcc: settings.bcc.clone(),
        subject: format!("Registration Confirmation - {}", settings.business_name),
        html,
        text,
    })
}

pub struct SesMailer;

fn utf8_content(data: &str) -> Result<Content, CheckoutError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| CheckoutError::EmailError(format!("build content: {e}")))
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: &ConfirmationEmail) -> Result<(), CheckoutError> {
        let shared = aws_config::load_from_env().await;
        let client = SesClient::new(&shared);

        let mut destination = Destination::builder().to_addresses(&email.to);
        if let Some(bcc) = &email.bcc {
            destination = destination.bcc_addresses(bcc);
        }
        let body = Body::builder()
            .html(utf8_content(&email.html)?)
            .text(utf8_content(&email.text)?)
            .build();
        let message = Message::builder()
            .subject(utf8_content(&email.subject)?)
            .body(body)
            .build();

        client
            .send_email()
            .from_email_address(&email.from)
            .destination(destination.build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| CheckoutError::EmailError(DisplayErrorContext(e).to_string()))?;

        info!(to = %email.to, "Confirmation email sent");
        Ok(())
    }
}
