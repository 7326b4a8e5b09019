/// SMTP delivery of operator notifications.
///
/// Built from the `[email]` config section. Each notification becomes one
/// plain-text message from `from_address` to `to_address`; a failed delivery
/// is reported back to the error channel, which logs it and carries on.

use super::{Notifier, NotifyError};
use crate::config::{EmailConfig, SmtpSecurity};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use std::time::Duration;

const SMTP_TIMEOUT_SECS: u64 = 30;

pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Prepare the transport. No connection is made until the first message.
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotifyError> {
        let from = mailbox(config.from_name.as_deref(), &config.from_address)?;
        let to = mailbox(config.to_name.as_deref(), &config.to_address)?;

        let builder = match config.security {
            SmtpSecurity::Starttls => SmtpTransport::starttls_relay(&config.host),
            SmtpSecurity::Tls => SmtpTransport::relay(&config.host),
            SmtpSecurity::Plain => Ok(SmtpTransport::builder_dangerous(&config.host)),
        }
        .map_err(|e| NotifyError(format!("invalid SMTP relay '{}': {}", config.host, e)))?;

        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.to
    }

    fn message(&self, subject: &str, body: &str) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError(format!("could not build email '{}': {}", subject, e)))
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = self.message(subject, body)?;
        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| NotifyError(format!("SMTP delivery to {} failed: {}", self.to, e)))
    }
}

fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, NotifyError> {
    let parsed: Address = address
        .trim()
        .parse()
        .map_err(|e| NotifyError(format!("invalid email address '{}': {}", address, e)))?;
    Ok(Mailbox::new(name.map(str::to_string), parsed))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
