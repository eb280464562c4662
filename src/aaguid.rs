//! AAGUID (Authenticator Attestation GUID) extraction.
//!
//! The AAGUID identifies the authenticator model and lives at bytes `[37, 53)`
//! of authenticator data, inside the attested credential data. Assertions never
//! carry it.

use uuid::Uuid;

use crate::config::{AAGUID_END, AAGUID_LEN, AAGUID_OFFSET, AUTH_DATA_MIN_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aaguid {
    /// All-zero AAGUID. Some providers zero it on purpose; not an error.
    UnknownProvider,
    /// Authenticator data too short to carry an AAGUID
    InvalidAuthData,
    /// AAGUID field is not 16 bytes
    InvalidBytes,
    Known { text: String, bytes: [u8; AAGUID_LEN] },
}

impl Aaguid {
    /// Canonical text of a known AAGUID
    pub fn text(&self) -> Option<&str> {
        match self {
            Aaguid::Known { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Aaguid::InvalidAuthData | Aaguid::InvalidBytes)
    }
}

pub fn extract_aaguid(authenticator_data: &[u8]) -> Aaguid {
    if authenticator_data.len() < AUTH_DATA_MIN_LEN {
        return Aaguid::InvalidAuthData;
    }
    // Attested data flagged but truncated; no partial recovery
    if authenticator_data.len() < AAGUID_END {
        return Aaguid::InvalidAuthData;
    }
    bytes_to_aaguid(&authenticator_data[AAGUID_OFFSET..AAGUID_END])
}

pub fn bytes_to_aaguid(bytes: &[u8]) -> Aaguid {
    let Ok(raw) = <[u8; AAGUID_LEN]>::try_from(bytes) else {
        return Aaguid::InvalidBytes;
    };
    let uuid = Uuid::from_bytes(raw);
    if uuid.is_nil() {
        return Aaguid::UnknownProvider;
    }
    Aaguid::Known {
        text: uuid.hyphenated().to_string(),
        bytes: raw,
    }
}
