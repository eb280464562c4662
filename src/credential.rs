use crate::aaguid::{extract_aaguid, Aaguid};
use crate::cose::CosePublicKey;
use crate::encoders::base64_standard_encode;
use crate::error::PasskeyResult;

/// A passkey this identity signs with.
///
/// `New` comes out of a registration ceremony and still has the authenticator
/// data, so its AAGUID can be read. `Existing` is rebuilt from an assertion
/// plus an out-of-band key lookup and has no AAGUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebAuthnCredential {
    New(NewCredential),
    Existing(ExistingCredential),
}

impl WebAuthnCredential {
    pub fn credential_id(&self) -> &[u8] {
        match self {
            WebAuthnCredential::New(c) => &c.credential_id,
            WebAuthnCredential::Existing(c) => &c.credential_id,
        }
    }

    /// Credential id in standard padded base64
    pub fn credential_id_text(&self) -> String {
        base64_standard_encode(self.credential_id())
    }

    pub fn public_key(&self) -> &CosePublicKey {
        match self {
            WebAuthnCredential::New(c) => &c.public_key,
            WebAuthnCredential::Existing(c) => &c.public_key,
        }
    }

    pub fn as_new(&self) -> Option<&NewCredential> {
        match self {
            WebAuthnCredential::New(c) => Some(c),
            WebAuthnCredential::Existing(_) => None,
        }
    }
}

impl From<NewCredential> for WebAuthnCredential {
    fn from(credential: NewCredential) -> Self {
        WebAuthnCredential::New(credential)
    }
}

impl From<ExistingCredential> for WebAuthnCredential {
    fn from(credential: ExistingCredential) -> Self {
        WebAuthnCredential::Existing(credential)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    credential_id: Vec<u8>,
    public_key: CosePublicKey,
    authenticator_data: Vec<u8>,
}

impl NewCredential {
    pub fn new(
        credential_id: Vec<u8>,
        cose_public_key: Vec<u8>,
        authenticator_data: Vec<u8>,
    ) -> PasskeyResult<Self> {
        Ok(Self {
            credential_id,
            public_key: CosePublicKey::new(cose_public_key)?,
            authenticator_data,
        })
    }

    pub fn credential_id(&self) -> &[u8] {
        &self.credential_id
    }

    pub fn public_key(&self) -> &CosePublicKey {
        &self.public_key
    }

    pub fn authenticator_data(&self) -> &[u8] {
        &self.authenticator_data
    }

    /// AAGUID text of the authenticator that created this credential.
    /// `None` for malformed data and for the all-zero "unknown provider" value.
    pub fn aaguid(&self) -> Option<String> {
        match extract_aaguid(&self.authenticator_data) {
            Aaguid::Known { text, .. } => Some(text),
            Aaguid::UnknownProvider | Aaguid::InvalidAuthData | Aaguid::InvalidBytes => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingCredential {
    credential_id: Vec<u8>,
    public_key: CosePublicKey,
}

impl ExistingCredential {
    pub fn new(credential_id: Vec<u8>, cose_public_key: Vec<u8>) -> PasskeyResult<Self> {
        Ok(Self::from_public_key(
            credential_id,
            CosePublicKey::new(cose_public_key)?,
        ))
    }

    pub fn from_public_key(credential_id: Vec<u8>, public_key: CosePublicKey) -> Self {
        Self {
            credential_id,
            public_key,
        }
    }

    pub fn credential_id(&self) -> &[u8] {
        &self.credential_id
    }

    pub fn public_key(&self) -> &CosePublicKey {
        &self.public_key
    }
}
