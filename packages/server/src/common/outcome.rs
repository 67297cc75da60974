//! Per-notification result handling.
//!
//! Entry points never return `Err`: every failure is contained in the
//! notification that caused it and surfaces as a [`NotificationOutcome`],
//! logged once at the ingress boundary.

use std::fmt;

use tracing::{error, info, warn};

/// Tally of marketing sends attempted during one notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }

    pub fn merge(self, other: DispatchReport) -> Self {
        Self {
            sent: self.sent + other.sent,
            failed: self.failed + other.failed,
        }
    }
}

/// Why a notification produced no marketing traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Referenced entity no longer resolvable on the host platform
    NotFound { entity: &'static str, id: String },
    /// No email to attach the event to
    MissingIdentity { entity: &'static str, id: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{} {} not found", entity, id),
            Self::MissingIdentity { entity, id } => {
                write!(f, "{} {} has no resolvable email", entity, id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Processing ran to the end. Individual sends may still have failed.
    Completed(DispatchReport),
    Skipped(SkipReason),
    /// Processing aborted before completion (host fetch failed, store unavailable)
    Failed(String),
}

impl NotificationOutcome {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Skipped(SkipReason::NotFound {
            entity,
            id: id.into(),
        })
    }

    pub fn missing_identity(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Skipped(SkipReason::MissingIdentity {
            entity,
            id: id.into(),
        })
    }

    pub fn failed(error: &anyhow::Error) -> Self {
        Self::Failed(format!("{:#}", error))
    }

    pub fn report(&self) -> Option<DispatchReport> {
        match self {
            Self::Completed(report) => Some(*report),
            _ => None,
        }
    }

    /// Emit the single log line for this outcome.
    pub fn log(&self, event: &str, subject_id: &str) {
        match self {
            Self::Completed(report) if report.failed > 0 => warn!(
                event,
                subject_id,
                sent = report.sent,
                failed = report.failed,
                "Notification processed with failed sends"
            ),
            Self::Completed(report) => info!(
                event,
                subject_id,
                sent = report.sent,
                "Notification processed"
            ),
            Self::Skipped(reason @ SkipReason::NotFound { .. }) => {
                warn!(event, subject_id, reason = %reason, "Notification skipped")
            }
            Self::Skipped(reason) => {
                info!(event, subject_id, reason = %reason, "Notification skipped")
            }
            Self::Failed(error) => error!(event, subject_id, error = %error, "Notification failed"),
        }
    }
}
