use std::fmt;

use async_trait::async_trait;
use rand::Rng;
use time::{Duration, OffsetDateTime};
use tracing::info;

/// Why a code was issued. Only used for delivery wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Signup,
    PasswordReset,
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtpPurpose::Signup => f.write_str("signup"),
            OtpPurpose::PasswordReset => f.write_str("password-reset"),
        }
    }
}

/// A freshly issued code and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub code: String,
    pub expires: OffsetDateTime,
}

impl OtpChallenge {
    pub fn issue(now: OffsetDateTime, ttl_minutes: i64) -> Self {
        Self {
            code: generate_code(),
            expires: now + Duration::minutes(ttl_minutes),
        }
    }
}

/// Six decimal digits, never with a leading zero.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Out-of-band delivery of one-time codes.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn deliver(&self, email: &str, code: &str, purpose: OtpPurpose) -> anyhow::Result<()>;
}

/// Writes codes to the log for the operator to relay.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn deliver(&self, email: &str, code: &str, purpose: OtpPurpose) -> anyhow::Result<()> {
        info!(%email, otp = %code, %purpose, "one-time code issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..500 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn challenge_expires_after_ttl() {
        let now = OffsetDateTime::now_utc();
        let challenge = OtpChallenge::issue(now, 10);
        assert_eq!(challenge.expires - now, Duration::minutes(10));
    }

    #[tokio::test]
    async fn log_notifier_accepts_delivery() {
        LogNotifier
            .deliver("a@x.com", "123456", OtpPurpose::Signup)
            .await
            .expect("log delivery never fails");
    }
}
