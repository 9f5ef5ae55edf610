//! Authentication manager for the phone → OTP sign-in flow

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::validation::{OtpForm, PhoneForm, Validate};
use crate::AuthConfig;

/// Where the user is in the sign-in flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AuthStep {
    Phone,
    Otp { country_code: String, phone: String },
    Success { country_code: String, phone: String },
}

impl AuthStep {
    fn name(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Otp { .. } => "otp",
            Self::Success { .. } => "success",
        }
    }
}

/// Sends and checks one-time codes
#[async_trait]
pub trait OtpVerifier: Send + Sync {
    async fn send_code(&self, phone: &PhoneForm) -> Result<(), AuthError>;
    async fn verify(&self, phone: &PhoneForm, code: &str) -> bool;

    /// Hint shown after a rejected code
    fn hint(&self) -> String {
        "again".to_string()
    }
}

/// Scripted verifier: "sends" after a fixed delay and accepts one code.
/// Not a security mechanism.
#[derive(Debug, Clone)]
pub struct SimulatedOtpVerifier {
    send_delay: Duration,
    accepted_code: String,
}

impl SimulatedOtpVerifier {
    pub fn new(send_delay: Duration, accepted_code: impl Into<String>) -> Self {
        Self {
            send_delay,
            accepted_code: accepted_code.into(),
        }
    }
}

#[async_trait]
impl OtpVerifier for SimulatedOtpVerifier {
    async fn send_code(&self, phone: &PhoneForm) -> Result<(), AuthError> {
        debug!("Sending OTP to {} {}", phone.country_code, phone.phone);
        tokio::time::sleep(self.send_delay).await;
        Ok(())
    }

    async fn verify(&self, _phone: &PhoneForm, code: &str) -> bool {
        code == self.accepted_code
    }

    fn hint(&self) -> String {
        self.accepted_code.clone()
    }
}

/// Drives the sign-in steps.
///
/// Mutating calls take `&mut self`, so a second submission cannot start while
/// the first one is still sending a code.
pub struct AuthManager {
    step: AuthStep,
    verifier: Arc<dyn OtpVerifier>,
}

impl AuthManager {
    pub fn new(verifier: Arc<dyn OtpVerifier>) -> Self {
        Self {
            step: AuthStep::Phone,
            verifier,
        }
    }

    /// Manager backed by [`SimulatedOtpVerifier`]
    pub fn simulated(config: &AuthConfig) -> Self {
        Self::new(Arc::new(SimulatedOtpVerifier::new(
            config.otp_send_delay,
            config.accepted_otp.clone(),
        )))
    }

    pub fn step(&self) -> &AuthStep {
        &self.step
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.step, AuthStep::Success { .. })
    }

    /// Validate the phone form, send a code and move to the OTP step
    pub async fn submit_phone(&mut self, form: PhoneForm) -> Result<(), AuthError> {
        if self.step != AuthStep::Phone {
            return Err(AuthError::WrongStep(self.step.name()));
        }

        let report = form.validate();
        if !report.is_valid() {
            return Err(AuthError::Validation(report));
        }

        self.verifier.send_code(&form).await?;

        info!("OTP sent to {} {}", form.country_code, form.phone);
        self.step = AuthStep::Otp {
            country_code: form.country_code,
            phone: form.phone,
        };
        Ok(())
    }

    /// Check the code; a rejected code keeps the OTP step
    pub async fn submit_otp(&mut self, form: OtpForm) -> Result<(), AuthError> {
        let AuthStep::Otp {
            country_code,
            phone,
        } = &self.step
        else {
            return Err(AuthError::WrongStep(self.step.name()));
        };

        let report = form.validate();
        if !report.is_valid() {
            return Err(AuthError::Validation(report));
        }

        let phone_form = PhoneForm::new(country_code.clone(), phone.clone());
        if !self.verifier.verify(&phone_form, &form.otp).await {
            warn!("OTP rejected for {} {}", phone_form.country_code, phone_form.phone);
            return Err(AuthError::InvalidOtp {
                hint: self.verifier.hint(),
            });
        }

        info!("Signed in as {} {}", phone_form.country_code, phone_form.phone);
        self.step = AuthStep::Success {
            country_code: phone_form.country_code,
            phone: phone_form.phone,
        };
        Ok(())
    }

    /// Return from the OTP step to the phone form
    pub fn change_phone(&mut self) -> Result<(), AuthError> {
        match self.step {
            AuthStep::Otp { .. } => {
                self.step = AuthStep::Phone;
                Ok(())
            }
            _ => Err(AuthError::WrongStep(self.step.name())),
        }
    }
}
