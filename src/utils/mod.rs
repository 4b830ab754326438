pub mod email_cache;
pub mod email_filter;

use crate::store::Store;
use email_cache::EmailCache;
use email_filter::EmailFilter;
use tracing::{info, warn};

/// Fast path for "is this email free?" in front of the store.
#[derive(Default)]
pub struct EmailIndex {
    pub filter: EmailFilter,
    pub cache: EmailCache,
}

impl EmailIndex {
    /// true  => email AVAILABLE
    /// false => email TAKEN
    pub async fn is_available(&self, email: &str, store: &dyn Store) -> bool {
        // 1️⃣ Cuckoo filter: fast negative
        if !self.filter.might_exist(email) {
            return true;
        }

        // 2️⃣ Moka cache: fast positive
        if self.cache.is_taken(email).await {
            return false;
        }

        // 3️⃣ Store fallback
        match store.find_user_by_email(email).await {
            Ok(Some(_)) => {
                self.cache.mark_taken(email).await;
                false
            }
            Ok(None) => true,
            Err(e) => {
                // fail-safe: let the insert's unique constraint decide
                warn!(error = %e, "Email availability lookup failed");
                true
            }
        }
    }

    pub async fn record(&self, email: &str) {
        self.filter.insert(email);
        self.cache.mark_taken(email).await;
    }

    pub async fn release(&self, email: &str) {
        self.filter.remove(email);
        self.cache.forget(email).await;
    }

    /// Load every registered email, in batches, into the filter and cache
    pub async fn warmup(&self, store: &dyn Store, batch_size: usize) -> anyhow::Result<()> {
        let emails = store
            .all_emails()
            .await
            .map_err(|e| anyhow::anyhow!("email warmup failed: {}", e))?;

        for batch in emails.chunks(batch_size.max(1)) {
            self.filter.insert_batch(batch);
            self.cache.batch_mark(batch).await;
        }

        info!("Email index warmup complete: {} accounts", emails.len());
        Ok(())
    }
}
