//! Per-user onboarding-completed flag.

use crate::storage::Backend;
use crate::Result;
use std::sync::Arc;

pub struct OnboardingStore {
    backend: Arc<dyn Backend>,
}

impl OnboardingStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn key(user_id: &str) -> String {
        format!("onboarding_completed_{}", user_id)
    }

    pub fn is_completed(&self, user_id: &str) -> bool {
        matches!(self.backend.read(&Self::key(user_id)), Ok(Some(_)))
    }

    pub fn complete(&self, user_id: &str) -> Result<()> {
        self.backend.write(&Self::key(user_id), "true")
    }
}
