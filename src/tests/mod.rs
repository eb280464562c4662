// Shared fixtures for the native test suite.
// The platform is replaced by an in-memory `CredentialsContainer` that replays
// queued responses and records what it was asked.

mod credential_tests;
mod options_tests;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use ciborium::value::Value as CborValue;
use futures::FutureExt;

use crate::error::PasskeyResult;
use crate::identity::{CredentialsContainer, RetrievePublicKeyFn};
use crate::types::webauthn::{
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, AuthenticatorResponse,
    PublicKeyCredential, PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
};

pub const TEST_ORIGIN: &str = "https://wallet.example.com";
pub const TEST_AAGUID: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

// === CBOR FIXTURES ===

/// EC2 P-256 COSE key with fixed coordinates
pub fn mock_cose_key() -> Vec<u8> {
    let cose_key = CborValue::Map(vec![
        (CborValue::Integer(1.into()), CborValue::Integer(2.into())), // kty: EC2
        (CborValue::Integer(3.into()), CborValue::Integer((-7).into())), // alg: ES256
        (CborValue::Integer((-1).into()), CborValue::Integer(1.into())), // crv: P-256
        (CborValue::Integer((-2).into()), CborValue::Bytes(vec![0x42u8; 32])), // x
        (CborValue::Integer((-3).into()), CborValue::Bytes(vec![0x84u8; 32])), // y
    ]);
    let mut bytes = Vec::new();
    ciborium::into_writer(&cose_key, &mut bytes).unwrap();
    bytes
}

/// Registration authenticator data: rpIdHash | flags | counter | aaguid | credIdLen | credId | key
pub fn mock_auth_data(aaguid: [u8; 16], credential_id: &[u8], cose_key: &[u8]) -> Vec<u8> {
    let mut auth_data = Vec::new();
    auth_data.extend_from_slice(&[0x49u8; 32]);
    auth_data.push(0x45); // UP=1, UV=1, AT=1
    auth_data.extend_from_slice(&1u32.to_be_bytes());
    auth_data.extend_from_slice(&aaguid);
    auth_data.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
    auth_data.extend_from_slice(credential_id);
    auth_data.extend_from_slice(cose_key);
    auth_data
}

pub fn mock_attestation_object(auth_data: Vec<u8>) -> Vec<u8> {
    let attestation = CborValue::Map(vec![
        (
            CborValue::Text("fmt".to_string()),
            CborValue::Text("none".to_string()),
        ),
        (
            CborValue::Text("attStmt".to_string()),
            CborValue::Map(Vec::new()),
        ),
        (
            CborValue::Text("authData".to_string()),
            CborValue::Bytes(auth_data),
        ),
    ]);
    let mut buffer = Vec::new();
    ciborium::into_writer(&attestation, &mut buffer).unwrap();
    buffer
}

// === CREDENTIAL FIXTURES ===

pub fn attestation_credential(raw_id: &[u8]) -> PublicKeyCredential {
    let auth_data = mock_auth_data(TEST_AAGUID, raw_id, &mock_cose_key());
    PublicKeyCredential {
        raw_id: raw_id.to_vec(),
        credential_type: "public-key".to_string(),
        authenticator_attachment: Some("platform".to_string()),
        response: AuthenticatorResponse::Attestation(AuthenticatorAttestationResponse {
            client_data_json: br#"{"type":"webauthn.create"}"#.to_vec(),
            attestation_object: Some(mock_attestation_object(auth_data)),
            transports: vec!["internal".to_string()],
        }),
    }
}

pub fn assertion_credential(raw_id: &[u8]) -> PublicKeyCredential {
    PublicKeyCredential {
        raw_id: raw_id.to_vec(),
        credential_type: "public-key".to_string(),
        authenticator_attachment: Some("platform".to_string()),
        response: AuthenticatorResponse::Assertion(AuthenticatorAssertionResponse {
            client_data_json: br#"{"type":"webauthn.get","challenge":"AQID"}"#.to_vec(),
            authenticator_data: Some(vec![0x49u8; 37]),
            signature: Some(vec![0x30, 0x44, 0x02, 0x20]),
            user_handle: Some(vec![0x07; 16]),
        }),
    }
}

// === MOCK PLATFORM ===

#[derive(Default)]
struct MockState {
    create_responses: RefCell<VecDeque<PasskeyResult<Option<PublicKeyCredential>>>>,
    get_responses: RefCell<VecDeque<PasskeyResult<Option<PublicKeyCredential>>>>,
    create_calls: Cell<usize>,
    get_calls: Cell<usize>,
    last_creation: RefCell<Option<PublicKeyCredentialCreationOptions>>,
    last_request: RefCell<Option<PublicKeyCredentialRequestOptions>>,
    last_timeout: Cell<Option<Duration>>,
}

/// Replays queued responses. Clones share state, so a test can keep a handle
/// after moving one into an identity. An empty queue answers `Ok(None)`.
#[derive(Clone, Default)]
pub struct MockCredentials {
    state: Rc<MockState>,
}

impl MockCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, response: PasskeyResult<Option<PublicKeyCredential>>) {
        self.state.create_responses.borrow_mut().push_back(response);
    }

    pub fn push_get(&self, response: PasskeyResult<Option<PublicKeyCredential>>) {
        self.state.get_responses.borrow_mut().push_back(response);
    }

    pub fn create_calls(&self) -> usize {
        self.state.create_calls.get()
    }

    pub fn get_calls(&self) -> usize {
        self.state.get_calls.get()
    }

    pub fn last_creation(&self) -> Option<PublicKeyCredentialCreationOptions> {
        self.state.last_creation.borrow().clone()
    }

    pub fn last_request(&self) -> Option<PublicKeyCredentialRequestOptions> {
        self.state.last_request.borrow().clone()
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        self.state.last_timeout.get()
    }
}

#[async_trait(?Send)]
impl CredentialsContainer for MockCredentials {
    async fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
        timeout: Duration,
    ) -> PasskeyResult<Option<PublicKeyCredential>> {
        self.state.create_calls.set(self.state.create_calls.get() + 1);
        *self.state.last_creation.borrow_mut() = Some(options.clone());
        self.state.last_timeout.set(Some(timeout));
        self.state
            .create_responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
        timeout: Duration,
    ) -> PasskeyResult<Option<PublicKeyCredential>> {
        self.state.get_calls.set(self.state.get_calls.get() + 1);
        *self.state.last_request.borrow_mut() = Some(options.clone());
        self.state.last_timeout.set(Some(timeout));
        self.state
            .get_responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

/// Key lookup that records every credential id it is asked for
pub fn recording_retrieve(
    response: Result<Vec<u8>, String>,
    requests: Rc<RefCell<Vec<Vec<u8>>>>,
) -> RetrievePublicKeyFn {
    Box::new(move |credential_id: Vec<u8>| {
        requests.borrow_mut().push(credential_id);
        let response = response.clone();
        async move { response }.boxed_local()
    })
}
