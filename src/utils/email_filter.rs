use autoscale_cuckoo_filter::CuckooFilter;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real account counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

#[inline]
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Probabilistic set of registered emails: a miss is definitive, a hit is not.
pub struct EmailFilter {
    inner: RwLock<CuckooFilter<String>>,
}

impl Default for EmailFilter {
    fn default() -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
        }
    }
}

impl EmailFilter {
    /// Check if an email might be registered (false positives possible).
    /// A poisoned lock answers "maybe" so the caller falls through to the store.
    pub fn might_exist(&self, email: &str) -> bool {
        let email = normalize(email);
        self.inner
            .read()
            .map(|filter| filter.contains(&email))
            .unwrap_or(true)
    }

    pub fn insert(&self, email: &str) {
        let email = normalize(email);
        if let Ok(mut filter) = self.inner.write() {
            filter.add(&email);
        }
    }

    pub fn remove(&self, email: &str) {
        let email = normalize(email);
        if let Ok(mut filter) = self.inner.write() {
            filter.remove(&email);
        }
    }

    /// Insert a batch of emails under a single write lock
    pub fn insert_batch(&self, emails: &[String]) {
        if let Ok(mut filter) = self.inner.write() {
            for email in emails {
                filter.add(&normalize(email));
            }
        }
    }
}
