use crate::utils::error::{MatcherError, Result};

/// Email gate: only addresses ending with the allowed domain may proceed.
#[derive(Debug, Clone)]
pub struct AccessGate {
    allowed_suffix: String,
}

impl AccessGate {
    pub fn new(allowed_suffix: impl Into<String>) -> Self {
        Self {
            allowed_suffix: allowed_suffix.into().trim().to_lowercase(),
        }
    }

    pub fn check(&self, email: Option<&str>) -> Result<()> {
        let email = email.map(str::trim).unwrap_or_default();

        if email.is_empty() {
            return Err(MatcherError::AccessDenied {
                reason: "a work email is required to continue".to_string(),
            });
        }

        if !email.to_lowercase().ends_with(&self.allowed_suffix) {
            tracing::warn!("🚫 Rejected access for {}", email);
            return Err(MatcherError::AccessDenied {
                reason: format!("access restricted to {} emails only", self.allowed_suffix),
            });
        }

        tracing::debug!("Access granted for {}", email);
        Ok(())
    }
}
