use lambda_runtime::{Error, LambdaEvent};
use serde_json::{Value, json};
use tracing::{error, info};

use super::confirm::process_confirmation;
use super::email::{MailSettings, Mailer, SesMailer};
use crate::core::config::AppConfig;
use crate::core::models::ConfirmationTask;
use crate::core::registrations::{FileRegistrationStore, RegistrationStore};

/// One SQS record with its decoded task.
#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub message_id: String,
    pub task: ConfirmationTask,
}

/// Decodes every SQS record body. Bodies that are not tasks are logged and
/// dropped, since redelivery would not fix them.
#[must_use]
pub fn parse_tasks(payload: &Value) -> Vec<QueuedTask> {
    payload
        .get("Records")
        .and_then(|records| records.as_array())
        .map(|records| {
            records
                .iter()
                .filter_map(|record| {
                    let body = record.get("body").and_then(|b| b.as_str())?;
                    let task = serde_json::from_str::<ConfirmationTask>(body)
                        .map_err(|e| {
                            error!(
                                "Failed to parse SQS message body into ConfirmationTask: {}",
                                e
                            );
                        })
                        .ok()?;
                    let message_id = record
                        .get("messageId")
                        .and_then(|id| id.as_str())
                        .unwrap_or_default()
                        .to_string();
                    Some(QueuedTask { message_id, task })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Processes each task on its own and returns the message ids that failed.
pub async fn process_batch(
    tasks: &[QueuedTask],
    mailer: &dyn Mailer,
    store: &dyn RegistrationStore,
    settings: &MailSettings,
) -> Vec<String> {
    let mut failed = Vec::new();
    for queued in tasks {
        let correlation_id = &queued.task.correlation_id;
        match process_confirmation(&queued.task, mailer, store, settings).await {
            Ok(status) => info!(correlation_id = %correlation_id, ?status, "Confirmation processed"),
            Err(e) => {
                error!(
                    correlation_id = %correlation_id,
                    message_id = %queued.message_id,
                    "Confirmation error: {}", e
                );
                failed.push(queued.message_id.clone());
            }
        }
    }
    failed
}

/// SQS partial batch response: only the listed messages are redelivered.
#[must_use]
pub fn batch_response(failed_message_ids: &[String]) -> Value {
    let failures: Vec<Value> = failed_message_ids
        .iter()
        .map(|id| json!({ "itemIdentifier": id }))
        .collect();
    json!({ "batchItemFailures": failures })
}

/// Lambda handler for the Worker entrypoint.
///
/// The event source mapping must enable `ReportBatchItemFailures` so that a
/// failed task does not redeliver the rest of its batch.
///
/// # Errors
///
/// Returns an error if configuration is missing.
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    let tasks = parse_tasks(&event.payload);
    info!("Worker received {} confirmation task(s)", tasks.len());

    let settings = MailSettings::from_config(&config);
    let store = FileRegistrationStore::new(config.registrations_dir.clone());

    let failed = process_batch(&tasks, &SesMailer, &store, &settings).await;
    if !failed.is_empty() {
        error!("{} of {} task(s) failed and will be retried", failed.len(), tasks.len());
    }

    Ok(batch_response(&failed))
}

pub use self::function_handler as handler;
