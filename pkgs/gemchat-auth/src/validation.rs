//! Form rules for the sign-in screens
//!
//! Every failing rule of a field is reported, not just the first one, so a
//! form can show all problems at once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

pub const PHONE_MIN_LEN: usize = 7;
pub const PHONE_MAX_LEN: usize = 15;
pub const OTP_LEN: usize = 6;

/// A rule violation on one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome of validating a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages reported for `field`
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

pub trait Validate {
    fn validate(&self) -> ValidationReport;
}

/// Country dial code plus local number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneForm {
    pub country_code: String,
    pub phone: String,
}

impl PhoneForm {
    pub fn new(country_code: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            phone: phone.into(),
        }
    }
}

impl Validate for PhoneForm {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.country_code.is_empty() {
            report.push("country_code", "Select a country code");
        }

        let len = self.phone.chars().count();
        if len < PHONE_MIN_LEN {
            report.push("phone", "Phone number too short");
        }
        if len > PHONE_MAX_LEN {
            report.push("phone", "Phone number too long");
        }
        if !DIGITS.is_match(&self.phone) {
            report.push("phone", "Phone number must be digits only");
        }

        report
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpForm {
    pub otp: String,
}

impl OtpForm {
    pub fn new(otp: impl Into<String>) -> Self {
        Self { otp: otp.into() }
    }
}

impl Validate for OtpForm {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.otp.chars().count() != OTP_LEN {
            report.push("otp", "OTP must be 6 digits");
        }
        if !DIGITS.is_match(&self.otp) {
            report.push("otp", "OTP must be digits only");
        }

        report
    }
}
