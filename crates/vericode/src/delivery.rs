//! Delivery abstraction for issued codes.
//!
//! The delivery layer hands the plaintext code to the end user (email,
//! SMS). Implementations wrap a real transport; [`memory::Outbox`] records
//! messages for tests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use vericode_core::Code;

use crate::error::DeliveryError;

/// Where a code is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Email address or phone number, as the channel understands it.
    pub address: String,
    /// Display name used in the greeting.
    pub name: String,
}

impl Recipient {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }
}

/// A composed verification message.
///
/// Carries the plaintext code; `Debug` omits it and the bodies.
#[derive(Clone)]
pub struct CodeMessage {
    code: Code,
    subject: String,
    text: String,
    html: String,
}

impl CodeMessage {
    /// Subject line used for every verification message.
    pub const SUBJECT: &'static str = "Verification code (2FA)";

    /// Build the subject, plain-text and HTML bodies for a code.
    pub fn compose(recipient: &Recipient, code: &Code, ttl: Duration) -> Self {
        let minutes = ttl_minutes(ttl);
        let text = format!(
            "Hello {}, your verification code is: {}\n\
             This code expires in {} minutes.\n\
             Please do not reply to this email.",
            recipient.name,
            code.as_str(),
            minutes
        );
        let html = format!(
            "<p>Hello <strong>{}</strong>,</p>\n\
             <p>Your verification code is:</p>\n\
             <h2>{}</h2>\n\
             <p>This code expires in {} minutes.</p>\n\
             <p>Please do not reply to this email.</p>",
            escape_html(&recipient.name),
            code.as_str(),
            minutes
        );

        Self {
            code: code.clone(),
            subject: Self::SUBJECT.to_string(),
            text,
            html,
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl fmt::Debug for CodeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeMessage")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// Rounded up, so a 90 s lifetime reads "2 minutes" rather than "1".
fn ttl_minutes(ttl: Duration) -> u64 {
    ttl.as_secs().div_ceil(60)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A channel that delivers verification messages.
///
/// Implementations must be thread-safe (Send + Sync) and must not log the
/// message bodies.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    /// Deliver a message to a recipient.
    async fn deliver(&self, recipient: &Recipient, message: &CodeMessage)
        -> Result<(), DeliveryError>;
}

/// A simple in-memory delivery channel for testing.
pub mod memory {
    use super::*;
    use tokio::sync::Mutex;

    /// A delivered message as recorded by the outbox.
    #[derive(Debug, Clone)]
    pub struct Delivered {
        pub recipient: Recipient,
        pub message: CodeMessage,
    }

    /// Records every message instead of sending it.
    ///
    /// Can be told to fail, to exercise the issuer's rollback path.
    #[derive(Default)]
    pub struct Outbox {
        inner: Mutex<OutboxInner>,
    }

    #[derive(Default)]
    struct OutboxInner {
        delivered: Vec<Delivered>,
        failure: Option<String>,
    }

    impl Outbox {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent deliveries fail with `reason`, or succeed again with `None`.
        pub async fn set_failure(&self, reason: Option<&str>) {
            self.inner.lock().await.failure = reason.map(String::from);
        }

        /// All messages delivered so far, oldest first.
        pub async fn delivered(&self) -> Vec<Delivered> {
            self.inner.lock().await.delivered.clone()
        }

        /// The most recent code delivered to an address.
        pub async fn last_code_for(&self, address: &str) -> Option<Code> {
            self.inner
                .lock()
                .await
                .delivered
                .iter()
                .rev()
                .find(|d| d.recipient.address == address)
                .map(|d| d.message.code().clone())
        }
    }

    #[async_trait]
    impl CodeDelivery for Outbox {
        async fn deliver(
            &self,
            recipient: &Recipient,
            message: &CodeMessage,
        ) -> Result<(), DeliveryError> {
            let mut inner = self.inner.lock().await;

            if let Some(reason) = &inner.failure {
                return Err(DeliveryError::Unavailable(reason.clone()));
            }

            inner.delivered.push(Delivered {
                recipient: recipient.clone(),
                message: message.clone(),
            });
            Ok(())
        }
    }
}
