use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use tracing::info;

use crate::core::{config::AppConfig, models::ConfirmationTask};
use crate::errors::CheckoutError;

/// Hand-off from the webhook to the worker.
#[async_trait]
pub trait ConfirmationQueue: Send + Sync {
    async fn enqueue(&self, task: &ConfirmationTask) -> Result<(), CheckoutError>;
}

pub struct SqsConfirmationQueue {
    queue_url: Option<String>,
}

impl SqsConfirmationQueue {
    #[must_use]
    pub fn new(queue_url: Option<String>) -> Self {
        Self { queue_url }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.confirmation_queue_url.clone())
    }
}

#[async_trait]
impl ConfirmationQueue for SqsConfirmationQueue {
    /// # Errors
    ///
    /// Returns an error if the queue is not configured, serialization fails,
    /// or the message cannot be sent to SQS.
    async fn enqueue(&self, task: &ConfirmationTask) -> Result<(), CheckoutError> {
        let queue_url = self.queue_url.as_deref().ok_or_else(|| {
            CheckoutError::GeneralError("CONFIRMATION_QUEUE_URL is not configured".to_string())
        })?;
        let shared_config = aws_config::load_from_env().await;
        let client = SqsClient::new(&shared_config);
        let message_body = serde_json::to_string(task)
            .map_err(|e| CheckoutError::GeneralError(format!("Failed to serialize task: {e}")))?;

        client
            .send_message()
            .queue_url(queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| CheckoutError::AwsError(format!("Failed to send message to SQS: {e}")))?;

        info!(
            correlation_id = %task.correlation_id,
            payment_intent_id = %task.payment_intent.id,
            "Confirmation task queued"
        );
        Ok(())
    }
}
