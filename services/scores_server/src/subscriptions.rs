//! In-memory email subscription list.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct SubscriptionStore {
    inner: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, email: String) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().insert(id, email);
        id
    }

    /// Case-insensitive membership check.
    pub fn exists(&self, email: &str) -> bool {
        let needle = email.to_lowercase();
        self.inner
            .read()
            .values()
            .any(|e| e.to_lowercase() == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_detection_is_case_insensitive() {
        let subs = SubscriptionStore::new();
        assert!(!subs.exists("fan@example.com"));

        subs.add("Fan@Example.com".to_string());
        assert!(subs.exists("fan@example.com"));
        assert!(subs.exists("FAN@EXAMPLE.COM"));
        assert!(!subs.exists("other@example.com"));
    }
}
