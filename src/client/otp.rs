//! Sign-in form input rules and the OTP resend countdown.

use lazy_static::lazy_static;
use regex::Regex;
use std::time::{Duration, Instant};

/// Seconds a customer waits before requesting another OTP
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
    static ref OTP_REGEX: Regex = Regex::new(r"^[0-9]{4}$").unwrap();
}

/// Validate a customer phone number (exactly 10 digits)
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }
    if !PHONE_REGEX.is_match(phone) {
        return Err("Phone number must be exactly 10 digits".to_string());
    }
    Ok(())
}

/// Validate a one-time password (exactly 4 digits)
pub fn validate_otp(otp: &str) -> Result<(), String> {
    if otp.is_empty() {
        return Err("OTP is required".to_string());
    }
    if !OTP_REGEX.is_match(otp) {
        return Err("OTP must be exactly 4 digits".to_string());
    }
    Ok(())
}

/// Countdown started after each successful OTP send
#[derive(Debug, Clone, Default)]
pub struct ResendCooldown {
    started: Option<Instant>,
}

impl ResendCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
    }

    /// Whole seconds left, rounded up
    pub fn remaining(&self, now: Instant) -> u64 {
        let Some(started) = self.started else {
            return 0;
        };
        let left = RESEND_COOLDOWN.saturating_sub(now.saturating_duration_since(started));
        let secs = left.as_secs();
        if left.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    pub fn can_resend(&self, now: Instant) -> bool {
        self.remaining(now) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("987654321").is_err());
        assert!(validate_phone("98765432100").is_err());
        assert!(validate_phone("98765-4321").is_err());
        assert!(validate_phone("९८७६५४३२१०").is_err());
    }

    #[test]
    fn test_validate_otp() {
        assert!(validate_otp("1234").is_ok());
        assert!(validate_otp("").is_err());
        assert!(validate_otp("123").is_err());
        assert!(validate_otp("12a4").is_err());
        assert!(validate_otp("12345").is_err());
    }

    #[test]
    fn test_cooldown_counts_down() {
        let start = Instant::now();
        let mut cooldown = ResendCooldown::new();
        assert!(cooldown.can_resend(start));

        cooldown.start(start);
        assert_eq!(cooldown.remaining(start), 60);
        assert!(!cooldown.can_resend(start));
        assert_eq!(cooldown.remaining(start + Duration::from_millis(500)), 60);
        assert_eq!(cooldown.remaining(start + Duration::from_secs(59)), 1);
        assert!(cooldown.can_resend(start + Duration::from_secs(60)));
        assert!(cooldown.can_resend(start + Duration::from_secs(600)));
    }
}
