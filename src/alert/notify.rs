/// Operator notification sinks.
///
/// Delivery itself (email, chat, pager) lives behind [`Notifier`]; the error
/// channel only decides *when* something is worth telling a human.

/// Notification delivery failed.
#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

pub trait Notifier {
    /// Send one notification.
    fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log under the `pws_sync::notify` target.
///
/// Point a log shipper or `RUST_LOG=pws_sync::notify=error` filter at it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        log::error!(target: "pws_sync::notify", "{}\n{}", subject, body);
        Ok(())
    }
}
