//! AI availability probe.
//!
//! The status is computed once at startup from the environment and then
//! handed to every component that reports it. Requests never re-read the
//! environment, so toggling the credential mid-process has no effect on
//! records already built or on records built later by the same server.

use crate::config::AiConfig;
use crate::models::{AiAvailability, AiStatus};

impl AiStatus {
    /// Inspect the configured credential variable.
    pub fn probe(config: &AiConfig) -> Self {
        Self::from_credential(config.api_key().is_some())
    }

    pub fn from_credential(has_key: bool) -> Self {
        Self {
            has_openai: has_key,
            has_any_ai: has_key,
            status: if has_key {
                AiAvailability::Online
            } else {
                AiAvailability::Offline
            },
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == AiAvailability::Online
    }
}
