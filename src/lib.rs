mod aaguid;
#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
mod browser;
mod config;
mod cose;
mod credential;
mod encoders;
mod error;
mod identity;
mod logger;
mod options;
#[cfg(test)]
mod tests;
mod types;

use wasm_bindgen::prelude::*;

pub use aaguid::{bytes_to_aaguid, extract_aaguid, Aaguid};
#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub use browser::{BrowserCredentials, BrowserOrigin};
pub use config::DEFAULT_CEREMONY_TIMEOUT;
pub use cose::{
    decode_attestation, parse_attestation_object, parse_authenticator_data, unwrap_der, wrap_der,
    AttestedCredential, CosePublicKey, DerEncodedPublicKey,
};
pub use credential::{ExistingCredential, NewCredential, WebAuthnCredential};
pub use encoders::SignatureEnvelope;
pub use error::{ErrorKind, PasskeyIdentityError, PasskeyResult};
pub use identity::{
    CredentialsContainer, ExistingCredentialOptions, IdentityState, NewCredentialOptions,
    RetrievePublicKeyFn, SignIdentity, WebAuthnIdentity,
};
pub use options::{
    build_registration_options, build_retrieval_options, relying_party_id, AppId,
    OriginResolver, RegistrationOverrides, RetrievalOverrides, StaticOrigin,
};
// Re-export progress and option types for TypeScript usage
pub use types::progress::{sign_step_name, ProgressCallback, SignProgress, SignStatus, SignStep};
pub use types::webauthn::*;

#[wasm_bindgen]
pub fn init_passkey_identity() {
    logger::init(config::CURRENT_LOG_LEVEL);
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// AAGUID of the authenticator that produced `auth_data`.
/// Resolves to `undefined` for the all-zero "unknown provider" AAGUID and
/// rejects on malformed authenticator data.
#[wasm_bindgen(js_name = extractAaguid)]
pub fn extract_aaguid_js(auth_data: &[u8]) -> Result<Option<String>, JsValue> {
    match extract_aaguid(auth_data) {
        Aaguid::Known { text, .. } => Ok(Some(text)),
        Aaguid::UnknownProvider => Ok(None),
        Aaguid::InvalidAuthData => Err(JsValue::from_str("invalid authenticator data")),
        Aaguid::InvalidBytes => Err(JsValue::from_str("invalid AAGUID bytes")),
    }
}

/// DER-wrap a COSE public key
#[wasm_bindgen(js_name = coseToDer)]
pub fn cose_to_der(cose: &[u8]) -> Result<Vec<u8>, JsValue> {
    Ok(CosePublicKey::new(cose.to_vec())?.to_raw())
}
