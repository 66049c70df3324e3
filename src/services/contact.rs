//! Contact form submissions.

use crate::domain::{ContactSubmission, ContactSummary};
use crate::errors::{ApiError, ApiResult};
use crate::repo::ContactStore;
use crate::utils::generate_ticket_id;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Inbound contact form; absent fields deserialize as empty
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ContactForm {
    fn check(&self) -> ApiResult<()> {
        let required = [&self.name, &self.email, &self.subject, &self.message];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(ApiError::invalid(
                "Missing required fields",
                "Please provide name, email, subject, and message",
            ));
        }
        self.validate().map_err(|_| {
            ApiError::invalid("Invalid email", "Please provide a valid email address")
        })
    }
}

pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Validate and store a submission, returning the stored record
    pub async fn submit(&self, form: ContactForm) -> ApiResult<ContactSubmission> {
        form.check()?;

        let now = Utc::now();
        let submission = ContactSubmission {
            id: generate_ticket_id(),
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
            timestamp: form.timestamp.unwrap_or_else(|| now.to_rfc3339()),
            user_agent: form.user_agent,
            referrer: form.referrer,
            status: "new".to_string(),
            created_at: now,
        };

        self.store.insert(submission.clone()).await?;
        info!(ticket_id = %submission.id, "Contact form submitted");
        Ok(submission)
    }

    pub async fn list(&self) -> ApiResult<Vec<ContactSummary>> {
        let items = self.store.list().await?;
        Ok(items.iter().map(ContactSummary::from).collect())
    }

    pub async fn get(&self, id: &str) -> ApiResult<ContactSubmission> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                error: "Submission not found",
                message: "Contact submission not found".to_string(),
            })
    }
}
