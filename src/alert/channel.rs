/// The error channel: logging, notification, batching and abort decisions.
///
/// One channel is created by the binary at startup and passed by reference
/// into the sync engine. Batchable events are queued per severity and
/// collapse into a single digest on [`ErrorChannel::flush`], so a long run
/// of partial days produces one notification rather than one per day.

use super::{ErrorEvent, Notifier, Severity, Terminated};
use std::collections::BTreeMap;

const DEFAULT_SUBJECT: &str = "Weather station sync";

#[derive(Debug, Clone)]
struct QueuedMessage {
    message: String,
    notify: bool,
}

pub struct ErrorChannel {
    notifier: Box<dyn Notifier>,
    subject: String,
    queued: BTreeMap<Severity, Vec<QueuedMessage>>,
    history: Vec<ErrorEvent>,
}

impl ErrorChannel {
    pub fn new(notifier: impl Notifier + 'static) -> Self {
        Self::boxed(Box::new(notifier))
    }

    /// For a notifier chosen at runtime.
    pub fn boxed(notifier: Box<dyn Notifier>) -> Self {
        Self {
            notifier,
            subject: DEFAULT_SUBJECT.to_string(),
            queued: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    /// Prefix used for notification subjects (typically the station id).
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Record an event.
    ///
    /// # Errors
    /// Returns [`Terminated`] when the event's `terminate` flag is set. The
    /// event has already been logged, notified or queued by then.
    pub fn handle(&mut self, event: ErrorEvent) -> Result<(), Terminated> {
        if event.terminate {
            return Err(self.abort(event));
        }
        self.record(event);
        Ok(())
    }

    /// Record `event` as terminating and hand back the abort reason.
    pub fn abort(&mut self, event: ErrorEvent) -> Terminated {
        let event = event.terminate();
        let terminated = Terminated {
            severity: event.severity,
            message: event.message.clone(),
        };
        self.record(event);
        terminated
    }

    fn record(&mut self, event: ErrorEvent) {
        log::log!(event.severity.log_level(), "{}", event.message);

        if event.batchable {
            self.queued
                .entry(event.severity)
                .or_default()
                .push(QueuedMessage {
                    message: event.message.clone(),
                    notify: event.notify,
                });
        } else if event.notify {
            let subject = format!("{} {}", self.subject, event.severity);
            self.send(&subject, &event.message);
        }

        self.history.push(event);
    }

    /// Emit one digest per severity with queued messages, then clear the queue.
    pub fn flush(&mut self) {
        let queued = std::mem::take(&mut self.queued);

        for (severity, messages) in queued {
            let body = messages
                .iter()
                .map(|m| format!("- {}", m.message))
                .collect::<Vec<_>>()
                .join("\n");

            log::log!(
                severity.log_level(),
                "{} {} message(s) this run:\n{}",
                messages.len(),
                severity,
                body
            );

            if messages.iter().any(|m| m.notify) {
                let subject = format!(
                    "{} {} digest ({} messages)",
                    self.subject,
                    severity,
                    messages.len()
                );
                self.send(&subject, &body);
            }
        }
    }

    /// Every event handled so far, in order.
    pub fn events(&self) -> &[ErrorEvent] {
        &self.history
    }

    /// Number of messages waiting for the next [`flush`](Self::flush).
    pub fn queued_len(&self) -> usize {
        self.queued.values().map(Vec::len).sum()
    }

    fn send(&self, subject: &str, body: &str) {
        if let Err(e) = self.notifier.notify(subject, body) {
            log::error!("{} (subject: {})", e, subject);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
