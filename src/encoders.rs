//! Encoding utilities for the passkey identity.
//! Includes base64 encoders and the CBOR signature envelope encoder.

use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use ciborium::Value as CborValue;

use crate::config::{envelope_fields, CBOR_SELF_DESCRIBE_TAG, DISPLAY_TRUNCATE_LENGTH};
use crate::error::{PasskeyIdentityError, PasskeyResult};

// === BASE64URL (URL-SAFE, NO PADDING) ===

/// Encode bytes to a base64url string using base64ct library
pub fn base64_url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

// === BASE64 STANDARD ===

/// Encode bytes to a standard (padded) base64 string
/// Used for the textual form of credential ids.
pub fn base64_standard_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Short base64url prefix of an id, for log lines
pub fn display_id(id: &[u8]) -> String {
    let encoded = base64_url_encode(id);
    if encoded.len() <= DISPLAY_TRUNCATE_LENGTH {
        encoded
    } else {
        format!("{}...", &encoded[..DISPLAY_TRUNCATE_LENGTH])
    }
}

// === SIGNATURE ENVELOPE ===

/// The record handed to a remote verifier: the raw assertion fields of one
/// WebAuthn `get` ceremony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEnvelope {
    pub authenticator_data: Vec<u8>,
    pub client_data_json: String,
    pub signature: Vec<u8>,
}

impl SignatureEnvelope {
    /// Build an envelope from assertion bytes. `clientDataJSON` is decoded as
    /// UTF-8 with replacement, the way `TextDecoder` does.
    pub fn new(authenticator_data: Vec<u8>, client_data_json: &[u8], signature: Vec<u8>) -> Self {
        Self {
            authenticator_data,
            client_data_json: String::from_utf8_lossy(client_data_json).into_owned(),
            signature,
        }
    }

    /// Encode as a self-describe tagged CBOR map with keys in wire order:
    /// `authenticator_data`, `client_data_json`, `signature`.
    pub fn encode(&self) -> PasskeyResult<Vec<u8>> {
        let map = CborValue::Map(vec![
            (
                CborValue::Text(envelope_fields::AUTHENTICATOR_DATA.to_string()),
                CborValue::Bytes(self.authenticator_data.clone()),
            ),
            (
                CborValue::Text(envelope_fields::CLIENT_DATA_JSON.to_string()),
                CborValue::Text(self.client_data_json.clone()),
            ),
            (
                CborValue::Text(envelope_fields::SIGNATURE.to_string()),
                CborValue::Bytes(self.signature.clone()),
            ),
        ]);
        let tagged = CborValue::Tag(CBOR_SELF_DESCRIBE_TAG, Box::new(map));

        let mut buffer = Vec::new();
        ciborium::into_writer(&tagged, &mut buffer)
            .map_err(|e| PasskeyIdentityError::EncodeCborSignature(e.to_string()))?;
        Ok(buffer)
    }

    /// Parse an encoded envelope. The self-describe tag is optional on input.
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let value: CborValue =
            ciborium::from_reader(bytes).map_err(|e| format!("Failed to parse CBOR: {}", e))?;
        let value = match value {
            CborValue::Tag(CBOR_SELF_DESCRIBE_TAG, inner) => *inner,
            other => other,
        };
        let CborValue::Map(entries) = value else {
            return Err("Signature envelope is not a CBOR map".to_string());
        };

        let mut authenticator_data = None;
        let mut client_data_json = None;
        let mut signature = None;
        for (key, value) in entries {
            let CborValue::Text(key) = key else {
                return Err("Signature envelope has a non-text key".to_string());
            };
            match (key.as_str(), value) {
                (envelope_fields::AUTHENTICATOR_DATA, CborValue::Bytes(b)) => {
                    authenticator_data = Some(b)
                }
                (envelope_fields::CLIENT_DATA_JSON, CborValue::Text(t)) => {
                    client_data_json = Some(t)
                }
                (envelope_fields::SIGNATURE, CborValue::Bytes(b)) => signature = Some(b),
                (other, _) => return Err(format!("Unexpected envelope field: {}", other)),
            }
        }

        Ok(Self {
            authenticator_data: authenticator_data
                .ok_or_else(|| "authenticator_data not found".to_string())?,
            client_data_json: client_data_json
                .ok_or_else(|| "client_data_json not found".to_string())?,
            signature: signature.ok_or_else(|| "signature not found".to_string())?,
        })
    }
}
