use axum_helpers::{AuditEvent, AuditOutcome};
use serde_json::json;

use crate::error::UserResult;
use crate::models::{AuditAction, User, UserLog};
use crate::repository::UnitOfWork;

/// Writes audit entries inside a unit of work and announces them once the
/// surrounding transaction has committed.
#[derive(Debug, Default)]
pub struct AuditRecorder {
    pending: Vec<UserLog>,
}

impl AuditRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry for `user`. A failure here must abort the unit of work.
    pub async fn record(
        &mut self,
        uow: &mut dyn UnitOfWork,
        action: AuditAction,
        user: &User,
    ) -> UserResult<UserLog> {
        let log = uow.append_log(user.id, action).await?;
        self.pending.push(log.clone());
        Ok(log)
    }

    /// Emits the recorded entries on the `audit` tracing target.
    pub fn publish(self) {
        for log in self.pending {
            AuditEvent::new(log.action.event_name(), AuditOutcome::Success)
                .with_resource(format!("user:{}", log.user_id))
                .with_details(json!({ "log_id": log.id }))
                .log();
        }
    }

    pub fn pending(&self) -> &[UserLog] {
        &self.pending
    }
}
