use thiserror::Error;
use wasm_bindgen::JsValue;

/// Coarse classification of [`PasskeyIdentityError`], for callers that branch on
/// the cause of a failure rather than on the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The host environment could not provide an origin or randomness
    Environment,
    /// The platform ceremony failed or returned an unusable credential
    Ceremony,
    /// The authenticator answered for a different credential than expected
    Integrity,
    /// Internal encoding failure
    Encoding,
    /// The identity was queried before it was initialized
    Usage,
}

/// Passkey identity error types.
///
/// None of these are retried inside the crate. Retrying a ceremony means
/// prompting the user again, which is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasskeyIdentityError {
    /// The origin could not be parsed into a relying party id
    #[error("could not derive a relying party id from origin {0:?}")]
    Hostname(String),

    /// The OS random source failed
    #[error("random source unavailable: {0}")]
    RandomSource(String),

    /// `navigator.credentials.create/get` resolved with `null`
    #[error("the authenticator returned no credential")]
    DeviceReturnedNull,

    /// The returned credential is not a `public-key` credential
    #[error("expected a public-key credential, got {0:?}")]
    CredentialNotPublicKey(String),

    /// The registration response carries no attestation object
    #[error("registration response carries no attestation object")]
    NoAttestation,

    /// The response is not an assertion carrying authenticator data
    #[error("assertion response carries no authenticator data")]
    NoAuthenticatorData,

    /// The assertion carries no signature
    #[error("assertion response carries no signature")]
    NoSignature,

    /// The attestation object or its authenticator data is malformed
    #[error("invalid attestation: {0}")]
    InvalidAttestation(String),

    /// The platform rejected the ceremony (user cancelled, not allowed, ...)
    #[error("ceremony rejected: {0}")]
    Ceremony(String),

    /// The ceremony deadline elapsed
    #[error("ceremony timed out after {timeout_ms} ms")]
    CeremonyTimeout { timeout_ms: u64 },

    /// The out-of-band public key lookup failed
    #[error("public key lookup failed: {0}")]
    RetrievePublicKey(String),

    /// The assertion was produced by another credential
    #[error("assertion credential id {actual} does not match {expected}")]
    InvalidCredentialId { expected: String, actual: String },

    /// Encoding the signature envelope failed
    #[error("failed to encode CBOR signature: {0}")]
    EncodeCborSignature(String),

    /// A DER public key could not be built or parsed
    #[error("invalid DER public key: {0}")]
    InvalidDer(String),

    /// The identity has no credential yet; sign once first
    #[error("credential not initialized, sign a challenge first")]
    CredentialNotInitialized,
}

impl PasskeyIdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PasskeyIdentityError::Hostname(_) | PasskeyIdentityError::RandomSource(_) => {
                ErrorKind::Environment
            }
            PasskeyIdentityError::DeviceReturnedNull
            | PasskeyIdentityError::CredentialNotPublicKey(_)
            | PasskeyIdentityError::NoAttestation
            | PasskeyIdentityError::NoAuthenticatorData
            | PasskeyIdentityError::NoSignature
            | PasskeyIdentityError::InvalidAttestation(_)
            | PasskeyIdentityError::Ceremony(_)
            | PasskeyIdentityError::CeremonyTimeout { .. }
            | PasskeyIdentityError::RetrievePublicKey(_) => ErrorKind::Ceremony,
            PasskeyIdentityError::InvalidCredentialId { .. } => ErrorKind::Integrity,
            PasskeyIdentityError::EncodeCborSignature(_) | PasskeyIdentityError::InvalidDer(_) => {
                ErrorKind::Encoding
            }
            PasskeyIdentityError::CredentialNotInitialized => ErrorKind::Usage,
        }
    }

    pub fn invalid_attestation(msg: &str) -> Self {
        PasskeyIdentityError::InvalidAttestation(msg.to_string())
    }

    pub fn invalid_der(msg: &str) -> Self {
        PasskeyIdentityError::InvalidDer(msg.to_string())
    }
}

impl From<PasskeyIdentityError> for JsValue {
    fn from(err: PasskeyIdentityError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type PasskeyResult<T> = Result<T, PasskeyIdentityError>;
