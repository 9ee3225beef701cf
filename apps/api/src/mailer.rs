//! Outgoing account mail: verification codes and the welcome message.
//!
//! Delivery is behind the [`Mailer`] trait. The server ships with
//! [`LogMailer`], which writes each message to the log. With the
//! `test-support` feature, `RecordingMailer` keeps messages in memory so
//! tests can read back the code that was sent.

#[cfg(any(test, feature = "test-support"))]
use std::sync::Mutex;

use tracing::info;

/// Mail delivery failure.
#[derive(Debug, thiserror::Error)]
#[error("Failed to send mail to {to}: {reason}")]
pub struct MailError {
    pub to: String,
    pub reason: String,
}

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn verification(to: &str, code: &str, ttl_secs: i64) -> Self {
        OutgoingMail {
            to: to.to_string(),
            subject: "Verify your Bazaar account".to_string(),
            body: format!(
                "Your verification code is {code}. It expires in {} minutes.",
                ttl_secs / 60
            ),
        }
    }

    pub fn welcome(to: &str, first_name: &str) -> Self {
        OutgoingMail {
            to: to.to_string(),
            subject: "Welcome to Bazaar".to_string(),
            body: format!("Hi {first_name}, your email is verified and your account is ready."),
        }
    }
}

/// Sends account mail.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Writes mail to the log instead of a mail server.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        LogMailer { from: from.into() }
    }
}

impl Mailer for LogMailer {
    fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        info!(
            from = %self.from,
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "Outgoing mail"
        );
        Ok(())
    }
}

/// Keeps every message in memory.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The six-digit code in the most recent verification mail to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .filter(|mail| mail.to == to)
            .find_map(|mail| {
                mail.body
                    .split(|c: char| !c.is_ascii_digit())
                    .find(|word| word.len() == 6)
                    .map(str::to_string)
            })
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Mailer for RecordingMailer {
    fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(mail);
        Ok(())
    }
}
