use serde::{Deserialize, Serialize};

use crate::config::PUBLIC_KEY_CREDENTIAL_TYPE;

// === WEBAUTHN OPTION TYPES ===
// Shapes handed to `navigator.credentials.create/get` under the `publicKey` key.
// Byte fields go through serde_bytes so serde-wasm-bindgen emits Uint8Array.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserVerificationRequirement {
    Required,
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationConveyancePreference {
    None,
    Indirect,
    Direct,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthenticatorAttachment {
    Platform,
    CrossPlatform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidentKeyRequirement {
    Discouraged,
    Preferred,
    Required,
}

/// Relying party the credential is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingParty {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// Opaque user handle
    #[serde(with = "serde_bytes")]
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyCredentialParameters {
    #[serde(rename = "type")]
    pub credential_type: String,
    /// COSE algorithm identifier
    pub alg: i64,
}

impl PublicKeyCredentialParameters {
    pub fn public_key(alg: i64) -> Self {
        Self {
            credential_type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            alg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelectionCriteria {
    pub authenticator_attachment: AuthenticatorAttachment,
    pub require_resident_key: bool,
    pub resident_key: ResidentKeyRequirement,
    pub user_verification: UserVerificationRequirement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialDescriptor {
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(with = "serde_bytes")]
    pub id: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

impl PublicKeyCredentialDescriptor {
    pub fn public_key(id: Vec<u8>) -> Self {
        Self {
            credential_type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            id,
            transports: None,
        }
    }
}

/// `PublicKeyCredentialCreationOptions` for a registration ceremony
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialCreationOptions {
    pub rp: RelyingParty,
    pub user: UserEntity,
    #[serde(with = "serde_bytes")]
    pub challenge: Vec<u8>,
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,
    pub authenticator_selection: AuthenticatorSelectionCriteria,
    pub attestation: AttestationConveyancePreference,
    pub exclude_credentials: Vec<PublicKeyCredentialDescriptor>,
    /// Hint for the browser UI, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// `PublicKeyCredentialRequestOptions` for an authentication ceremony
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialRequestOptions {
    #[serde(with = "serde_bytes")]
    pub challenge: Vec<u8>,
    pub rp_id: String,
    pub allow_credentials: Vec<PublicKeyCredentialDescriptor>,
    pub user_verification: UserVerificationRequirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// === CEREMONY RESULT TYPES ===
// What the platform hands back from `create` / `get`, already copied out of
// the JS ArrayBuffers.

/// Attestation response from a registration ceremony
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticatorAttestationResponse {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Option<Vec<u8>>,
    pub transports: Vec<String>,
}

/// Assertion response from an authentication ceremony
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticatorAssertionResponse {
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
    pub user_handle: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorResponse {
    Attestation(AuthenticatorAttestationResponse),
    Assertion(AuthenticatorAssertionResponse),
}

/// A `PublicKeyCredential` returned by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredential {
    pub raw_id: Vec<u8>,
    /// Expected to be "public-key"
    pub credential_type: String,
    pub authenticator_attachment: Option<String>,
    pub response: AuthenticatorResponse,
}

impl PublicKeyCredential {
    pub fn is_public_key(&self) -> bool {
        self.credential_type == PUBLIC_KEY_CREDENTIAL_TYPE
    }

    pub fn attestation(&self) -> Option<&AuthenticatorAttestationResponse> {
        match &self.response {
            AuthenticatorResponse::Attestation(response) => Some(response),
            AuthenticatorResponse::Assertion(_) => None,
        }
    }

    pub fn assertion(&self) -> Option<&AuthenticatorAssertionResponse> {
        match &self.response {
            AuthenticatorResponse::Assertion(response) => Some(response),
            AuthenticatorResponse::Attestation(_) => None,
        }
    }
}
