/// Repository layer for contact submissions
use crate::domain::ContactSubmission;
use crate::errors::ApiResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage seam for contact submissions, keyed by ticket id
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, submission: ContactSubmission) -> ApiResult<()>;

    async fn get(&self, id: &str) -> ApiResult<Option<ContactSubmission>>;

    /// All submissions, oldest first
    async fn list(&self) -> ApiResult<Vec<ContactSubmission>>;
}

/// Process-local store; contents are lost on restart
#[derive(Default)]
pub struct InMemoryContactStore {
    items: RwLock<HashMap<String, ContactSubmission>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, submission: ContactSubmission) -> ApiResult<()> {
        self.items
            .write()
            .await
            .insert(submission.id.clone(), submission);
        Ok(())
    }

    async fn get(&self, id: &str) -> ApiResult<Option<ContactSubmission>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn list(&self) -> ApiResult<Vec<ContactSubmission>> {
        let mut items: Vec<ContactSubmission> = self.items.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }
}
