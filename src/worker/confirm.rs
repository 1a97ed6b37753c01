use chrono::Utc;
use tracing::{error, info, warn};

use super::email::{Mailer, MailSettings, build_confirmation_email};
use crate::core::models::{CompletedRegistration, ConfirmationTask};
use crate::core::registrations::RegistrationStore;
use crate::errors::CheckoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStatus {
    Sent,
    Skipped,
    Failed,
    /// The payment was already confirmed by an earlier delivery.
    Duplicate,
}

/// Records the completed registration, then sends the confirmation email.
///
/// A payment that is already recorded is skipped entirely, so a redelivered
/// task never emails the student twice. Email problems are logged and do not
/// fail the task.
///
/// # Errors
///
/// Returns an error if the registration log cannot be read or written; no
/// email has been sent in that case.
pub async fn process_confirmation(
    task: &ConfirmationTask,
    mailer: &dyn Mailer,
    store: &dyn RegistrationStore,
    settings: &MailSettings,
) -> Result<EmailStatus, CheckoutError> {
    let intent = &task.payment_intent;
    info!(
        correlation_id = %task.correlation_id,
        payment_intent_id = %intent.id,
        "Processing confirmation"
    );

    if store.is_completed(&intent.id).await? {
        info!(
            "Payment {} already confirmed; ignoring redelivery (corr_id={})",
            intent.id, task.correlation_id
        );
        return Ok(EmailStatus::Duplicate);
    }

    store
        .record_completed(&CompletedRegistration::from_payment_intent(intent, Utc::now()))
        .await?;

    let email = build_confirmation_email(intent, settings);

    #[cfg(feature = "debug-logs")]
    if let Some(email) = &email {
        info!("Confirmation email body:\n{}", email.text);
    }

    let status = match email {
        Some(email) => match mailer.send(&email).await {
            Ok(()) => EmailStatus::Sent,
            Err(e) => {
                error!(
                    "Message could not be sent (corr_id={}): {}",
                    task.correlation_id, e
                );
                EmailStatus::Failed
            }
        },
        None => {
            warn!(
                "No sender or recipient for payment {}; skipping email (corr_id={})",
                intent.id, task.correlation_id
            );
            EmailStatus::Skipped
        }
    };

    Ok(status)
}
