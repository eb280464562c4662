// === CONFIGURATION CONSTANTS ===
// Configuration values for the passkey signing identity

use std::time::Duration;

/// Change this constant and recompile to adjust logging verbosity
/// Available levels: Error, Warn, Info, Debug, Trace
pub const CURRENT_LOG_LEVEL: log::Level = log::Level::Info;

// === CEREMONY DEFAULTS ===

/// Deadline applied to every `navigator.credentials.create/get` call unless overridden
pub const DEFAULT_CEREMONY_TIMEOUT: Duration = Duration::from_secs(60);

/// Registration challenge size in bytes
pub const CHALLENGE_SIZE: usize = 16;

/// Generated user handle size in bytes
pub const USER_HANDLE_SIZE: usize = 16;

/// The only credential type this crate accepts from the platform
pub const PUBLIC_KEY_CREDENTIAL_TYPE: &str = "public-key";

/// COSE algorithm identifier for ECDSA P-256 with SHA-256
pub const COSE_ALG_ES256: i64 = -7;

/// COSE algorithm identifier for RSASSA-PKCS1-v1_5 with SHA-256
pub const COSE_ALG_RS256: i64 = -257;

// === AUTHENTICATOR DATA LAYOUT ===
// rpIdHash(32) | flags(1) | signCount(4) | aaguid(16) | credIdLen(2) | credId | coseKey

/// Offset of the flags byte
pub const AUTH_DATA_FLAGS_OFFSET: usize = 32;

/// Minimum authenticator data size (assertions never go beyond this without extensions)
pub const AUTH_DATA_MIN_LEN: usize = 37;

/// Attested credential data present (AT flag, bit 6)
pub const AUTH_DATA_FLAG_AT: u8 = 0x40;

/// Offset of the AAGUID inside attested credential data
pub const AAGUID_OFFSET: usize = AUTH_DATA_MIN_LEN;

/// AAGUID size in bytes
pub const AAGUID_LEN: usize = 16;

/// End of the AAGUID field (exclusive)
pub const AAGUID_END: usize = AAGUID_OFFSET + AAGUID_LEN;

/// Size of the big-endian credential id length prefix
pub const CREDENTIAL_ID_LENGTH_SIZE: usize = 2;

// === WIRE ENCODING ===

/// DER sequence holding OID 1.3.6.1.4.1.56387.1.1, which marks a COSE-encoded key
pub const DER_COSE_OID: [u8; 14] = [
    0x30, 0x0c, 0x06, 0x0a, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x83, 0xb8, 0x43, 0x01, 0x01,
];

/// CBOR self-describe tag prefixed to the signature envelope (0xd9d9f7)
pub const CBOR_SELF_DESCRIBE_TAG: u64 = 55799;

/// Envelope keys, in wire order
pub mod envelope_fields {
    pub const AUTHENTICATOR_DATA: &str = "authenticator_data";
    pub const CLIENT_DATA_JSON: &str = "client_data_json";
    pub const SIGNATURE: &str = "signature";
}

/// Number of characters to show when logging credential ids
pub const DISPLAY_TRUNCATE_LENGTH: usize = 12;
