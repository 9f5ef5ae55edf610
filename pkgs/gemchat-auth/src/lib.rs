//! Phone/OTP sign-in for gemchat
//!
//! This crate provides:
//! - Phone and OTP form validation
//! - The country dial-code list, with a built-in fallback
//! - The sign-in step machine behind a swappable OTP verifier

pub mod auth_manager;
pub mod countries;
pub mod error;
pub mod validation;

pub use auth_manager::{AuthManager, AuthStep, OtpVerifier, SimulatedOtpVerifier};
pub use countries::{
    fallback_countries, load_countries, parse_countries, Country, CountrySource,
    RestCountriesClient, DEFAULT_COUNTRIES_URL,
};
pub use error::AuthError;
pub use validation::{FieldError, OtpForm, PhoneForm, Validate, ValidationReport};

use std::time::Duration;

/// Configuration for the sign-in flow
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Simulated delay for sending a code (default: 1500ms)
    pub otp_send_delay: Duration,

    /// Pause on the success screen before moving on (default: 1500ms)
    pub redirect_delay: Duration,

    /// The only code the simulated verifier accepts (default: "123456")
    pub accepted_otp: String,

    /// Country list endpoint
    pub countries_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_send_delay: Duration::from_millis(1500),
            redirect_delay: Duration::from_millis(1500),
            accepted_otp: "123456".to_string(),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
        }
    }
}
