//! Passkey-backed signing identity.
//!
//! A [`WebAuthnIdentity`] is either `Pending` (built from an existing passkey
//! whose id and public key are not known yet) or `Initialized`. Every `sign`
//! runs three phases:
//!
//! 1. ask the platform for an assertion over the challenge
//! 2. check the credential id, or on the first sign of a pending identity,
//!    look the public key up and move to `Initialized`
//! 3. encode the assertion into the CBOR signature envelope
//!
//! Phase 2 is the only place the state changes.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use log::{debug, info, warn};

use crate::config::DEFAULT_CEREMONY_TIMEOUT;
use crate::cose::{decode_attestation, CosePublicKey};
use crate::credential::{ExistingCredential, NewCredential, WebAuthnCredential};
use crate::encoders::{base64_standard_encode, display_id, SignatureEnvelope};
use crate::error::{PasskeyIdentityError, PasskeyResult};
use crate::options::{
    build_registration_options, build_retrieval_options, AppId, OriginResolver,
    RegistrationOverrides, RetrievalOverrides,
};
use crate::types::progress::{send_sign_progress, ProgressCallback, SignStatus, SignStep};
use crate::types::webauthn::{
    PublicKeyCredential, PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
};

// === PLATFORM CAPABILITIES ===

/// `navigator.credentials`, injected.
///
/// `Ok(None)` means the platform resolved with `null`. Implementations must
/// give up after `timeout` and report [`PasskeyIdentityError::CeremonyTimeout`].
#[async_trait(?Send)]
pub trait CredentialsContainer {
    async fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
        timeout: Duration,
    ) -> PasskeyResult<Option<PublicKeyCredential>>;

    async fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
        timeout: Duration,
    ) -> PasskeyResult<Option<PublicKeyCredential>>;
}

/// Looks up the public key of a credential id. May return COSE or DER bytes.
pub type RetrievePublicKeyFn =
    Box<dyn Fn(Vec<u8>) -> LocalBoxFuture<'static, Result<Vec<u8>, String>>>;

/// Minimal signing capability shared by identities
#[async_trait(?Send)]
pub trait SignIdentity {
    fn public_key(&self) -> PasskeyResult<&CosePublicKey>;

    async fn sign(&mut self, challenge: &[u8]) -> PasskeyResult<Vec<u8>>;
}

// === OPTIONS ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredentialOptions {
    pub registration: RegistrationOverrides,
    pub timeout: Duration,
}

impl Default for NewCredentialOptions {
    fn default() -> Self {
        Self {
            registration: RegistrationOverrides::default(),
            timeout: DEFAULT_CEREMONY_TIMEOUT,
        }
    }
}

pub struct ExistingCredentialOptions {
    pub retrieve_public_key: RetrievePublicKeyFn,
    pub app_id: Option<AppId>,
    pub timeout: Duration,
}

impl ExistingCredentialOptions {
    pub fn new(retrieve_public_key: RetrievePublicKeyFn) -> Self {
        Self {
            retrieve_public_key,
            app_id: None,
            timeout: DEFAULT_CEREMONY_TIMEOUT,
        }
    }

    pub fn with_app_id(mut self, app_id: AppId) -> Self {
        self.app_id = Some(app_id);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// === STATE ===

pub enum IdentityState {
    /// Credential id and public key arrive with the first assertion
    Pending {
        retrieve_public_key: RetrievePublicKeyFn,
    },
    Initialized {
        credential: WebAuthnCredential,
    },
}

impl fmt::Debug for IdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityState::Pending { .. } => f.write_str("Pending"),
            IdentityState::Initialized { credential } => f
                .debug_struct("Initialized")
                .field("credential_id", &display_id(credential.credential_id()))
                .finish(),
        }
    }
}

fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn ensure_public_key(credential: &PublicKeyCredential) -> PasskeyResult<()> {
    if credential.is_public_key() {
        Ok(())
    } else {
        Err(PasskeyIdentityError::CredentialNotPublicKey(
            credential.credential_type.clone(),
        ))
    }
}

/// Emit Success or Error for `step` according to `result`, then hand it back
fn finish_phase<T>(
    on_progress: Option<ProgressCallback>,
    step: SignStep,
    result: PasskeyResult<T>,
) -> PasskeyResult<T> {
    let status = match &result {
        Ok(_) => SignStatus::Success,
        Err(e) => {
            warn!("Sign phase {:?} failed: {}", step, e);
            SignStatus::Error
        }
    };
    send_sign_progress(on_progress, step, status);
    result
}

// === IDENTITY ===

pub struct WebAuthnIdentity<C, O> {
    container: C,
    origin: O,
    app_id: Option<AppId>,
    timeout: Duration,
    state: IdentityState,
}

impl<C: CredentialsContainer, O: OriginResolver> WebAuthnIdentity<C, O> {
    /// Register a new passkey and return an initialized identity
    pub async fn create_with_new_credential(
        container: C,
        origin: O,
        options: NewCredentialOptions,
    ) -> PasskeyResult<Self> {
        let mut creation = build_registration_options(&origin, &options.registration)?;
        creation.timeout = Some(timeout_ms(options.timeout));
        info!("Creating passkey for relying party {}", creation.rp.id);

        let credential = container
            .create(&creation, options.timeout)
            .await?
            .ok_or(PasskeyIdentityError::DeviceReturnedNull)?;
        ensure_public_key(&credential)?;

        let attestation_object = credential
            .attestation()
            .and_then(|response| response.attestation_object.as_deref())
            .ok_or(PasskeyIdentityError::NoAttestation)?;
        let attested = decode_attestation(attestation_object)?;
        if attested.credential_id != credential.raw_id {
            warn!(
                "Attested credential id {} differs from rawId {}",
                display_id(&attested.credential_id),
                display_id(&credential.raw_id)
            );
        }

        let new_credential = NewCredential::new(
            credential.raw_id.clone(),
            attested.cose_public_key,
            attested.authenticator_data,
        )?;
        info!(
            "Passkey created: {}",
            display_id(new_credential.credential_id())
        );

        Ok(Self {
            container,
            origin,
            app_id: options.registration.app_id,
            timeout: options.timeout,
            state: IdentityState::Initialized {
                credential: new_credential.into(),
            },
        })
    }

    /// Wrap a passkey that already exists on the device. Nothing is asked of
    /// the platform until the first `sign`.
    pub fn create_with_existing_credential(
        container: C,
        origin: O,
        options: ExistingCredentialOptions,
    ) -> Self {
        debug!("Existing passkey identity created in pending state");
        Self {
            container,
            origin,
            app_id: options.app_id,
            timeout: options.timeout,
            state: IdentityState::Pending {
                retrieve_public_key: options.retrieve_public_key,
            },
        }
    }

    pub fn public_key(&self) -> PasskeyResult<&CosePublicKey> {
        Ok(self.credential()?.public_key())
    }

    pub fn credential(&self) -> PasskeyResult<&WebAuthnCredential> {
        match &self.state {
            IdentityState::Initialized { credential } => Ok(credential),
            IdentityState::Pending { .. } => Err(PasskeyIdentityError::CredentialNotInitialized),
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, IdentityState::Initialized { .. })
    }

    pub fn state(&self) -> &IdentityState {
        &self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn sign(&mut self, challenge: &[u8]) -> PasskeyResult<Vec<u8>> {
        self.sign_with_progress(challenge, None).await
    }

    /// Sign `challenge`, reporting each phase to `on_progress`.
    /// A phase that fails reports `Error` and the later phases never start.
    pub async fn sign_with_progress(
        &mut self,
        challenge: &[u8],
        on_progress: Option<ProgressCallback<'_>>,
    ) -> PasskeyResult<Vec<u8>> {
        send_sign_progress(
            on_progress,
            SignStep::RequestingUserCredential,
            SignStatus::InProgress,
        );
        let assertion = finish_phase(
            on_progress,
            SignStep::RequestingUserCredential,
            self.request_user_credential(challenge).await,
        )?;

        send_sign_progress(
            on_progress,
            SignStep::FinalizingCredential,
            SignStatus::InProgress,
        );
        finish_phase(
            on_progress,
            SignStep::FinalizingCredential,
            self.finalize_credential(&assertion.raw_id).await,
        )?;

        send_sign_progress(on_progress, SignStep::Signing, SignStatus::InProgress);
        finish_phase(
            on_progress,
            SignStep::Signing,
            encode_signature(&assertion),
        )
    }

    async fn request_user_credential(&self, challenge: &[u8]) -> PasskeyResult<PublicKeyCredential> {
        let allow_credentials = match &self.state {
            IdentityState::Initialized { credential } => vec![credential.credential_id().to_vec()],
            IdentityState::Pending { .. } => Vec::new(),
        };
        let overrides = RetrievalOverrides {
            app_id: self.app_id.clone(),
            allow_credentials,
        };
        let mut request = build_retrieval_options(&self.origin, challenge, &overrides)?;
        request.timeout = Some(timeout_ms(self.timeout));

        let credential = self
            .container
            .get(&request, self.timeout)
            .await?
            .ok_or(PasskeyIdentityError::DeviceReturnedNull)?;
        ensure_public_key(&credential)?;
        debug!("Assertion received from {}", display_id(&credential.raw_id));
        Ok(credential)
    }

    async fn finalize_credential(&mut self, raw_id: &[u8]) -> PasskeyResult<()> {
        let lookup = match &self.state {
            IdentityState::Initialized { credential } => {
                if credential.credential_id() != raw_id {
                    return Err(PasskeyIdentityError::InvalidCredentialId {
                        expected: credential.credential_id_text(),
                        actual: base64_standard_encode(raw_id),
                    });
                }
                return Ok(());
            }
            IdentityState::Pending {
                retrieve_public_key,
            } => retrieve_public_key(raw_id.to_vec()),
        };

        let key_bytes = lookup
            .await
            .map_err(PasskeyIdentityError::RetrievePublicKey)?;
        // The looked-up key is opaque COSE; it is only re-wrapped
        let public_key = CosePublicKey::new(key_bytes)?;
        let credential = ExistingCredential::from_public_key(raw_id.to_vec(), public_key);

        info!("Passkey identity initialized: {}", display_id(raw_id));
        self.state = IdentityState::Initialized {
            credential: credential.into(),
        };
        Ok(())
    }
}

/// Pack an assertion into the signature envelope. A missing response or
/// `authenticator_data` fails `NoAuthenticatorData`; a missing `signature`
/// fails `NoSignature`.
fn encode_signature(credential: &PublicKeyCredential) -> PasskeyResult<Vec<u8>> {
    let response = credential
        .assertion()
        .ok_or(PasskeyIdentityError::NoAuthenticatorData)?;
    let authenticator_data = response
        .authenticator_data
        .clone()
        .ok_or(PasskeyIdentityError::NoAuthenticatorData)?;
    let signature = response
        .signature
        .clone()
        .ok_or(PasskeyIdentityError::NoSignature)?;

    SignatureEnvelope::new(authenticator_data, &response.client_data_json, signature).encode()
}

#[async_trait(?Send)]
impl<C: CredentialsContainer, O: OriginResolver> SignIdentity for WebAuthnIdentity<C, O> {
    fn public_key(&self) -> PasskeyResult<&CosePublicKey> {
        WebAuthnIdentity::public_key(self)
    }

    async fn sign(&mut self, challenge: &[u8]) -> PasskeyResult<Vec<u8>> {
        WebAuthnIdentity::sign(self, challenge).await
    }
}
