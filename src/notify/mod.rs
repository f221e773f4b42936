//! Operator notification contract.
//!
//! # Responsibilities
//! - Define the (message, severity) surface every user-visible event goes through
//! - Fix the display duration sinks use for auto-dismissal
//!
//! The console and the tests plug their own sinks in; the library itself never
//! renders anything.

use std::time::Duration;

/// How long a sink that can dismiss keeps a notification visible.
pub const DISPLAY_TTL: Duration = Duration::from_secs(5);

/// Severity of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress information, e.g. a pending transaction.
    Info,
    /// A completed operation.
    Success,
    /// A failed operation or unmet precondition.
    Error,
}

/// Sink for operator-visible messages.
///
/// Implementations decide rendering and dismissal; [`DISPLAY_TTL`] is the agreed
/// visibility window for sinks that auto-dismiss.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Notifier that forwards messages to the tracing subscriber.
///
/// Useful as a default sink when the console runs headless (e.g. scripted input).
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "notify", "{message}"),
            Severity::Success => tracing::info!(target: "notify", outcome = "success", "{message}"),
            Severity::Error => tracing::error!(target: "notify", "{message}"),
        }
    }
}
