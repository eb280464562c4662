//! Sign Progress Types
//!
//! `WebAuthnIdentity::sign_with_progress` reports every phase of the sign
//! protocol to an optional callback:
//!
//! 1. RequestingUserCredential: the platform `get` ceremony (user prompt)
//! 2. FinalizingCredential: credential id check, or first-time key lookup
//! 3. Signing: CBOR encoding of the assertion into the signature envelope
//!
//! Each phase emits `InProgress` and then exactly one of `Success` / `Error`.
//! A phase that never starts emits nothing.

use log::debug;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Phases of the sign protocol.
/// Values start at 200 to stay clear of other numeric step codes on the JS side.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignStep {
    RequestingUserCredential = 200,
    FinalizingCredential = 201,
    Signing = 202,
}

impl TryFrom<u32> for SignStep {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, <Self as TryFrom<u32>>::Error> {
        match value {
            200 => Ok(SignStep::RequestingUserCredential),
            201 => Ok(SignStep::FinalizingCredential),
            202 => Ok(SignStep::Signing),
            _ => Err(format!("Invalid SignStep value: {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignStatus {
    InProgress,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignProgress {
    pub step: SignStep,
    pub status: SignStatus,
}

/// Callback receiving sign progress events
pub type ProgressCallback<'a> = &'a dyn Fn(SignProgress);

/// Convert SignStep enum to readable string for debugging
pub fn sign_step_name(step: SignStep) -> &'static str {
    match step {
        SignStep::RequestingUserCredential => "requesting-user-credential",
        SignStep::FinalizingCredential => "finalizing-credential",
        SignStep::Signing => "signing",
    }
}

pub fn sign_status_name(status: SignStatus) -> &'static str {
    match status {
        SignStatus::InProgress => "in_progress",
        SignStatus::Success => "success",
        SignStatus::Error => "error",
    }
}

/// Log the event and forward it to the callback, if any
pub fn send_sign_progress(on_progress: Option<ProgressCallback>, step: SignStep, status: SignStatus) {
    debug!(
        "Sign progress: {} ({}) - {}",
        sign_step_name(step),
        step as u32,
        sign_status_name(status)
    );
    if let Some(callback) = on_progress {
        callback(SignProgress { step, status });
    }
}
