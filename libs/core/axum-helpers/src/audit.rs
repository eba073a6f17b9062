//! Audit records for security-relevant mutations.
//!
//! Events go to the `audit` tracing target so they can be routed apart from
//! application logs.
//!
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome};
//!
//! AuditEvent::new(Some(owner_id), "booking.approve", Some(format!("booking:{}", id)), AuditOutcome::Success)
//!     .with_details(serde_json::json!({"status": "APPROVED"}))
//!     .log();
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// Calling user, when known
    pub actor_id: Option<i64>,
    /// Dotted action name, e.g. `user.delete`
    pub action: String,
    /// `kind:id` of the affected record
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        actor_id: Option<i64>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            actor_id,
            action: action.into(),
            resource,
            outcome,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            actor_id = ?self.actor_id,
            action = %self.action,
            resource = ?self.resource,
            outcome = ?self.outcome,
            timestamp = %self.timestamp,
            details = ?self.details,
            "{}",
            serde_json::to_string(&self).unwrap_or_else(|_| self.action.clone())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_outcome_lowercase() {
        let event = AuditEvent::new(
            Some(3),
            "user.delete",
            Some("user:3".to_string()),
            AuditOutcome::Success,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["actor_id"], 3);
        assert_eq!(json["resource"], "user:3");
    }

    #[test]
    fn test_with_details() {
        let event = AuditEvent::new(None, "booking.approve", None, AuditOutcome::Denied)
            .with_details(serde_json::json!({"reason": "not owner"}));
        assert_eq!(event.details.unwrap()["reason"], "not owner");
    }
}
