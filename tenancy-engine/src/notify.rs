//! Notification and telemetry collaborators
//!
//! Both collaborators are fire-and-forget from the engine's perspective:
//! a notifier failure is observable only through the telemetry sink, never
//! through the invitation operation's own result, and the sink itself can
//! neither fail nor block.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Notification error types.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The mail collaborator rejected or dropped the message
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Outbound invitation mail collaborator.
#[async_trait]
pub trait InvitationNotifier: Send + Sync {
    /// Send the invitation email.
    async fn send_invitation_email(
        &self,
        organization_name: &str,
        recipient: &str,
        inviter_name: &str,
        invitation_link: &str,
    ) -> Result<(), NotifyError>;
}

/// Error-telemetry sink for out-of-band investigation.
///
/// Receives unexpected and infrastructure-class errors with their context.
/// Implementations must never block or alter control flow.
pub trait TelemetrySink: Send + Sync {
    /// Report an error under a short context label.
    fn report(&self, context: &str, error: &(dyn std::error::Error + 'static));
}

/// Sink that forwards reports to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn report(&self, context: &str, error: &(dyn std::error::Error + 'static)) {
        tracing::error!(context, error = %error, "engine error reported");
    }
}

/// A captured invitation email, for assertions in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentInvitation {
    /// Organization display name
    pub organization_name: String,
    /// Recipient address
    pub recipient: String,
    /// Inviter display name
    pub inviter_name: String,
    /// Acceptance link
    pub invitation_link: String,
}

/// Notifier that records every send. Suitable for testing.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentInvitation>>,
}

impl RecordingNotifier {
    /// Create an empty recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails captured so far.
    pub fn sent(&self) -> Vec<SentInvitation> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl InvitationNotifier for RecordingNotifier {
    async fn send_invitation_email(
        &self,
        organization_name: &str,
        recipient: &str,
        inviter_name: &str,
        invitation_link: &str,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(SentInvitation {
                organization_name: organization_name.to_string(),
                recipient: recipient.to_string(),
                inviter_name: inviter_name.to_string(),
                invitation_link: invitation_link.to_string(),
            });
        Ok(())
    }
}

/// Notifier that always fails. Suitable for testing failure reporting.
#[derive(Debug)]
pub struct FailingNotifier {
    reason: String,
}

impl FailingNotifier {
    /// Create a notifier that fails with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl InvitationNotifier for FailingNotifier {
    async fn send_invitation_email(
        &self,
        _organization_name: &str,
        _recipient: &str,
        _inviter_name: &str,
        _invitation_link: &str,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery(self.reason.clone()))
    }
}

/// Sink that records every report. Suitable for testing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports captured so far, formatted as `context: error`.
    pub fn reports(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn report(&self, context: &str, error: &(dyn std::error::Error + 'static)) {
        self.reports
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(format!("{context}: {error}"));
    }
}

/// Report a store failure to telemetry and surface it as an engine error.
pub(crate) fn surface_store(
    telemetry: &dyn TelemetrySink,
    context: &'static str,
    err: crate::store::StoreError,
) -> crate::error::EngineError {
    telemetry.report(context, &err);
    crate::error::EngineError::Store(err)
}

/// Report an engine error to telemetry if it is infrastructure-class.
///
/// Domain outcomes pass through untouched; only the underlying store cause
/// is ever forwarded to the sink.
pub(crate) fn report_infrastructure(
    telemetry: &dyn TelemetrySink,
    context: &'static str,
    err: crate::error::EngineError,
) -> crate::error::EngineError {
    if let crate::error::EngineError::Store(cause) = &err {
        telemetry.report(context, cause);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier_captures_sends() {
        let notifier = RecordingNotifier::new();
        notifier
            .send_invitation_email("Acme", "new@example.com", "Ada", "/accept")
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "new@example.com");
    }

    #[tokio::test]
    async fn test_failing_notifier() {
        let notifier = FailingNotifier::new("smtp down");
        let result = notifier
            .send_invitation_email("Acme", "new@example.com", "Ada", "/accept")
            .await;
        assert!(matches!(result, Err(NotifyError::Delivery(_))));
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.report("invite", &NotifyError::Delivery("smtp down".to_string()));
        assert_eq!(sink.reports().len(), 1);
        assert!(sink.reports()[0].contains("smtp down"));
    }
}
