use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::CheckoutError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    /// Full text used for matching; not returned to clients.
    #[serde(default, skip_serializing)]
    pub body: String,
}

impl BlogPost {
    /// Lower-cased title, excerpt and body joined with spaces.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.excerpt, self.body).to_lowercase()
    }
}

/// Posts in display order, as published.
#[derive(Debug, Clone, Default)]
pub struct BlogIndex {
    posts: Vec<BlogPost>,
}

impl BlogIndex {
    #[must_use]
    pub fn new(posts: Vec<BlogPost>) -> Self {
        Self { posts }
    }

    /// Loads a JSON array of posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array of posts.
    pub async fn load(path: &Path) -> Result<Self, CheckoutError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            CheckoutError::GeneralError(format!("read blog index {}: {e}", path.display()))
        })?;
        let posts: Vec<BlogPost> = serde_json::from_str(&raw)
            .map_err(|e| CheckoutError::ParseError(format!("blog index: {e}")))?;
        info!("Blog index loaded with {} posts", posts.len());
        Ok(Self::new(posts))
    }

    #[must_use]
    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
