//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use vericode::delivery::memory::Outbox;
use vericode::{Challenge, ChallengeService, Code, Recipient, VericodeConfig};
use vericode_core::{HashConfig, MIN_COST};
use vericode_store::MemoryStore;

/// Default config with the cheapest bcrypt cost, so tests stay fast.
pub fn fast_config() -> VericodeConfig {
    VericodeConfig {
        hashing: HashConfig::new(MIN_COST),
        ..VericodeConfig::default()
    }
}

/// A challenge service over a memory store and an outbox.
pub struct TestFixture {
    pub service: ChallengeService<MemoryStore, Outbox>,
}

impl TestFixture {
    /// Create a fixture with [`fast_config`].
    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    /// Create a fixture with a custom config.
    ///
    /// Panics if the config is invalid.
    pub fn with_config(config: VericodeConfig) -> Self {
        Self {
            service: ChallengeService::new(MemoryStore::new(), Outbox::new(), config)
                .expect("invalid fixture config"),
        }
    }

    /// The recipient used for a subject.
    pub fn recipient(subject: &str) -> Recipient {
        Recipient::new(format!("{}@example.test", subject), subject)
    }

    /// Issue a challenge at time 0 and return it with the delivered code.
    pub async fn issue(&self, subject: &str) -> (Challenge, Code) {
        self.issue_at(subject, 0).await
    }

    /// Issue a challenge at `now` and return it with the delivered code.
    pub async fn issue_at(&self, subject: &str, now: i64) -> (Challenge, Code) {
        let recipient = Self::recipient(subject);
        let challenge = self
            .service
            .issue_at(subject, &recipient, now)
            .await
            .expect("issue failed");
        let code = self
            .service
            .delivery()
            .last_code_for(&recipient.address)
            .await
            .expect("no code delivered");
        (challenge, code)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A candidate guaranteed to differ from `code` but with the same width.
pub fn wrong_code(code: &Code) -> String {
    code.as_str()
        .bytes()
        .map(|b| if b == b'9' { '0' } else { (b + 1) as char })
        .collect()
}
