use super::email_filter::normalize;
use moka::future::Cache;
use std::time::Duration;

/// Recently seen registered emails. Only taken emails are stored.
#[derive(Clone)]
pub struct EmailCache {
    inner: Cache<String, bool>,
}

impl Default for EmailCache {
    fn default() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(500_000) // tune based on memory
                .time_to_live(Duration::from_secs(86400)) // 24h TTL
                .build(),
        }
    }
}

impl EmailCache {
    pub async fn mark_taken(&self, email: &str) {
        self.inner.insert(normalize(email), true).await;
    }

    pub async fn is_taken(&self, email: &str) -> bool {
        self.inner.get(&normalize(email)).await.unwrap_or(false)
    }

    pub async fn forget(&self, email: &str) {
        self.inner.invalidate(&normalize(email)).await;
    }

    /// Mark a batch of emails as taken concurrently
    pub async fn batch_mark(&self, emails: &[String]) {
        let futures: Vec<_> = emails
            .iter()
            .map(|e| self.inner.insert(normalize(e), true))
            .collect();

        futures::future::join_all(futures).await;
    }
}
