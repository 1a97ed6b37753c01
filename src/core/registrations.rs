//! Append-only registration logs.
//!
//! Each record is one JSON object per line. Attempts are split per day
//! (`registration_<date>.log`); completed registrations and failed payments
//! each go to a single file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use super::models::{CompletedRegistration, FailedPayment, RegistrationAttempt};
use crate::errors::CheckoutError;

pub const COMPLETED_FILE: &str = "completed_registrations.json";
pub const FAILED_FILE: &str = "failed_payments.log";

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn record_attempt(&self, attempt: &RegistrationAttempt) -> Result<(), CheckoutError>;

    async fn record_completed(
        &self,
        registration: &CompletedRegistration,
    ) -> Result<(), CheckoutError>;

    async fn record_failed(&self, failed: &FailedPayment) -> Result<(), CheckoutError>;

    /// Whether a completed registration exists for `payment_id`.
    async fn is_completed(&self, payment_id: &str) -> Result<bool, CheckoutError>;
}

/// File-backed store rooted at a directory that is created on first write.
pub struct FileRegistrationStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRegistrationStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn attempt_log_path(&self, attempt: &RegistrationAttempt) -> PathBuf {
        self.dir.join(format!(
            "registration_{}.log",
            attempt.timestamp.format("%Y-%m-%d")
        ))
    }

    async fn append_line<T: Serialize + Sync>(
        &self,
        path: &Path,
        record: &T,
    ) -> Result<(), CheckoutError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| CheckoutError::StorageError(format!("serialize record: {e}")))?;
        line.push('\n');

        // Whole-line writes under one lock so concurrent handlers never interleave.
        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for FileRegistrationStore {
    async fn record_attempt(&self, attempt: &RegistrationAttempt) -> Result<(), CheckoutError> {
        let path = self.attempt_log_path(attempt);
        self.append_line(&path, attempt).await?;
        info!(
            payment_intent_id = %attempt.payment_intent_id,
            course = %attempt.course,
            "Registration attempt logged"
        );
        Ok(())
    }

    async fn record_completed(
        &self,
        registration: &CompletedRegistration,
    ) -> Result<(), CheckoutError> {
        let path = self.dir.join(COMPLETED_FILE);
        self.append_line(&path, registration).await?;
        info!(payment_id = %registration.payment_id, "Completed registration saved");
        Ok(())
    }

    async fn record_failed(&self, failed: &FailedPayment) -> Result<(), CheckoutError> {
        let path = self.dir.join(FAILED_FILE);
        self.append_line(&path, failed).await?;
        info!(payment_id = %failed.payment_id, "Failed payment logged");
        Ok(())
    }

    async fn is_completed(&self, payment_id: &str) -> Result<bool, CheckoutError> {
        let _guard = self.write_lock.lock().await;
        let raw = match fs::read_to_string(self.dir.join(COMPLETED_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .any(|record| record.get("payment_id").and_then(Value::as_str) == Some(payment_id)))
    }
}
