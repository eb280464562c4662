use ciborium::Value as CborValue;
use log::debug;

use crate::config::{
    AAGUID_END, AUTH_DATA_FLAGS_OFFSET, AUTH_DATA_FLAG_AT, AUTH_DATA_MIN_LEN,
    CREDENTIAL_ID_LENGTH_SIZE, DER_COSE_OID,
};
use crate::error::{PasskeyIdentityError, PasskeyResult};

// === ATTESTATION PARSING ===

/// The pieces of a registration response this crate keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredential {
    pub authenticator_data: Vec<u8>,
    pub credential_id: Vec<u8>,
    pub cose_public_key: Vec<u8>,
}

/// Parse WebAuthn attestation object to extract authData
pub fn parse_attestation_object(attestation_object_bytes: &[u8]) -> PasskeyResult<Vec<u8>> {
    let cbor_value: CborValue = ciborium::from_reader(attestation_object_bytes).map_err(|e| {
        PasskeyIdentityError::InvalidAttestation(format!("Failed to parse CBOR: {}", e))
    })?;

    let CborValue::Map(map) = cbor_value else {
        return Err(PasskeyIdentityError::invalid_attestation(
            "Attestation object is not a CBOR map",
        ));
    };

    map.into_iter()
        .find_map(|(key, value)| match (key, value) {
            (CborValue::Text(key), CborValue::Bytes(auth_data)) if key == "authData" => {
                Some(auth_data)
            }
            _ => None,
        })
        .ok_or_else(|| {
            PasskeyIdentityError::invalid_attestation("authData not found in attestation object")
        })
}

/// Walk the attested credential data and split out the credential id and COSE key
pub fn parse_authenticator_data(auth_data_bytes: &[u8]) -> PasskeyResult<(Vec<u8>, Vec<u8>)> {
    if auth_data_bytes.len() < AUTH_DATA_MIN_LEN {
        return Err(PasskeyIdentityError::invalid_attestation(
            "Authenticator data too short",
        ));
    }

    let flags = auth_data_bytes[AUTH_DATA_FLAGS_OFFSET];
    if (flags & AUTH_DATA_FLAG_AT) == 0 {
        return Err(PasskeyIdentityError::invalid_attestation(
            "No attested credential data present",
        ));
    }

    // Skip rpIdHash(32) + flags(1) + counter(4) + AAGUID(16)
    let mut offset = AAGUID_END;
    if auth_data_bytes.len() < offset + CREDENTIAL_ID_LENGTH_SIZE {
        return Err(PasskeyIdentityError::invalid_attestation(
            "Authenticator data too short for credential ID length",
        ));
    }
    let cred_id_length =
        u16::from_be_bytes([auth_data_bytes[offset], auth_data_bytes[offset + 1]]) as usize;
    offset += CREDENTIAL_ID_LENGTH_SIZE;

    if auth_data_bytes.len() < offset + cred_id_length {
        return Err(PasskeyIdentityError::invalid_attestation(
            "Authenticator data too short for credential ID",
        ));
    }
    let credential_id = auth_data_bytes[offset..offset + cred_id_length].to_vec();
    offset += cred_id_length;

    // The rest is the credential public key (COSE format)
    let credential_public_key = auth_data_bytes[offset..].to_vec();
    if credential_public_key.is_empty() {
        return Err(PasskeyIdentityError::invalid_attestation(
            "Authenticator data carries no credential public key",
        ));
    }
    Ok((credential_id, credential_public_key))
}

/// Decode an attestation object into its authenticator data and COSE public key
pub fn decode_attestation(attestation_object: &[u8]) -> PasskeyResult<AttestedCredential> {
    let authenticator_data = parse_attestation_object(attestation_object)?;
    let (credential_id, cose_public_key) = parse_authenticator_data(&authenticator_data)?;

    debug!(
        "Decoded attestation: {} bytes authData, {} bytes COSE key",
        authenticator_data.len(),
        cose_public_key.len()
    );
    Ok(AttestedCredential {
        authenticator_data,
        credential_id,
        cose_public_key,
    })
}

// === DER WRAPPING ===

/// Largest length the 1-4 byte DER length form used here can express
const MAX_DER_LENGTH: usize = 0xff_ffff;

fn encode_len_bytes(len: usize) -> PasskeyResult<usize> {
    match len {
        0..=0x7f => Ok(1),
        0x80..=0xff => Ok(2),
        0x100..=0xffff => Ok(3),
        0x1_0000..=MAX_DER_LENGTH => Ok(4),
        _ => Err(PasskeyIdentityError::InvalidDer(format!(
            "length {} is too long (> {:#x})",
            len, MAX_DER_LENGTH
        ))),
    }
}

fn encode_len(buf: &mut Vec<u8>, len: usize) -> PasskeyResult<()> {
    let bytes = (len as u32).to_be_bytes();
    match encode_len_bytes(len)? {
        1 => buf.push(bytes[3]),
        2 => buf.extend_from_slice(&[0x81, bytes[3]]),
        3 => buf.extend_from_slice(&[0x82, bytes[2], bytes[3]]),
        _ => buf.extend_from_slice(&[0x83, bytes[1], bytes[2], bytes[3]]),
    }
    Ok(())
}

/// Returns `(length, number of length bytes consumed)`
fn decode_len(buf: &[u8], offset: usize) -> PasskeyResult<(usize, usize)> {
    let first = *buf
        .get(offset)
        .ok_or_else(|| PasskeyIdentityError::invalid_der("truncated length"))?;
    if first < 0x80 {
        return Ok((first as usize, 1));
    }
    let count = match first {
        0x81 => 1,
        0x82 => 2,
        0x83 => 3,
        _ => return Err(PasskeyIdentityError::invalid_der("length too long")),
    };
    let bytes = buf
        .get(offset + 1..offset + 1 + count)
        .ok_or_else(|| PasskeyIdentityError::invalid_der("truncated length"))?;
    let len = bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
    Ok((len, count + 1))
}

/// Wrap `payload` as `SEQUENCE { oid, BIT STRING { 0x00 || payload } }`.
/// `oid` must already be a DER-encoded AlgorithmIdentifier sequence.
pub fn wrap_der(payload: &[u8], oid: &[u8]) -> PasskeyResult<Vec<u8>> {
    // The bit string length includes the unused-bits byte
    let bit_string_len = payload.len() + 1;
    let bit_string_header_len = 2 + encode_len_bytes(bit_string_len)?;
    let len = oid.len() + bit_string_header_len + payload.len();

    let mut buf = Vec::with_capacity(1 + encode_len_bytes(len)? + len);
    buf.push(0x30);
    encode_len(&mut buf, len)?;
    buf.extend_from_slice(oid);
    buf.push(0x03);
    encode_len(&mut buf, bit_string_len)?;
    buf.push(0x00);
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Inverse of [`wrap_der`]; rejects any structure other than the expected one.
pub fn unwrap_der(der: &[u8], oid: &[u8]) -> PasskeyResult<Vec<u8>> {
    let expect = |offset: usize, byte: u8, what: &str| -> PasskeyResult<()> {
        match der.get(offset) {
            Some(b) if *b == byte => Ok(()),
            _ => Err(PasskeyIdentityError::InvalidDer(format!("expected {}", what))),
        }
    };

    let mut offset = 0;
    expect(offset, 0x30, "sequence")?;
    offset += 1;
    let (seq_len, seq_len_bytes) = decode_len(der, offset)?;
    offset += seq_len_bytes;
    let content_len = der.len().saturating_sub(offset);
    if seq_len != content_len {
        return Err(PasskeyIdentityError::InvalidDer(format!(
            "DER sequence length mismatch: declared {}, actual {}",
            seq_len, content_len
        )));
    }

    if der.get(offset..offset + oid.len()) != Some(oid) {
        return Err(PasskeyIdentityError::invalid_der("not the expected OID"));
    }
    offset += oid.len();

    expect(offset, 0x03, "bit string")?;
    offset += 1;
    let (bit_string_len, bit_len_bytes) = decode_len(der, offset)?;
    offset += bit_len_bytes;
    expect(offset, 0x00, "0 padding")?;
    offset += 1;

    let payload = &der[offset..];
    if bit_string_len == 0 || payload.len() != bit_string_len - 1 {
        return Err(PasskeyIdentityError::InvalidDer(format!(
            "DER payload mismatch: expected length {}, actual length {}",
            bit_string_len.saturating_sub(1),
            payload.len()
        )));
    }
    Ok(payload.to_vec())
}

// === PUBLIC KEY TYPES ===

/// DER-encoded public key bytes, kept distinct from arbitrary byte buffers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerEncodedPublicKey(Vec<u8>);

impl DerEncodedPublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for DerEncodedPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A COSE-encoded credential public key together with its DER wrapping.
///
/// The COSE bytes are never interpreted; the DER form is computed once at
/// construction and cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosePublicKey {
    cose: Vec<u8>,
    der: DerEncodedPublicKey,
}

impl CosePublicKey {
    pub fn new(cose: Vec<u8>) -> PasskeyResult<Self> {
        let der = DerEncodedPublicKey(wrap_der(&cose, &DER_COSE_OID)?);
        Ok(Self { cose, der })
    }

    /// Recover a key from its DER form (as produced by [`CosePublicKey::to_der`])
    pub fn from_der(der: &[u8]) -> PasskeyResult<Self> {
        let cose = unwrap_der(der, &DER_COSE_OID)?;
        Ok(Self {
            cose,
            der: DerEncodedPublicKey(der.to_vec()),
        })
    }

    pub fn cose(&self) -> &[u8] {
        &self.cose
    }

    pub fn to_der(&self) -> &DerEncodedPublicKey {
        &self.der
    }

    /// The DER bytes as a plain buffer
    pub fn to_raw(&self) -> Vec<u8> {
        self.der.0.clone()
    }
}
