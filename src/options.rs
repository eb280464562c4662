//! Relying-party option builders for the registration and authentication
//! ceremonies.
//!
//! The relying party id is the hostname of the current origin unless an
//! [`AppId`] pins it. Origin and page title come from an [`OriginResolver`]
//! so the builders run the same way in the browser and in native tests.

use log::debug;
use url::Url;

use crate::config::{CHALLENGE_SIZE, COSE_ALG_ES256, COSE_ALG_RS256, USER_HANDLE_SIZE};
use crate::error::{PasskeyIdentityError, PasskeyResult};
use crate::types::webauthn::{
    AttestationConveyancePreference, AuthenticatorAttachment, AuthenticatorSelectionCriteria,
    PublicKeyCredentialCreationOptions, PublicKeyCredentialDescriptor,
    PublicKeyCredentialParameters, PublicKeyCredentialRequestOptions, RelyingParty,
    ResidentKeyRequirement, UserEntity, UserVerificationRequirement,
};

// === ORIGIN ===

/// Where the identity is running: the page origin and its title.
pub trait OriginResolver {
    /// Serialized origin, e.g. `https://app.example.com`
    fn origin(&self) -> PasskeyResult<String>;
    /// Document title, if any
    fn title(&self) -> Option<String>;
}

/// Fixed origin and title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticOrigin {
    origin: String,
    title: Option<String>,
}

impl StaticOrigin {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl OriginResolver for StaticOrigin {
    fn origin(&self) -> PasskeyResult<String> {
        Ok(self.origin.clone())
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}

impl<T: OriginResolver + ?Sized> OriginResolver for &T {
    fn origin(&self) -> PasskeyResult<String> {
        (**self).origin()
    }

    fn title(&self) -> Option<String> {
        (**self).title()
    }
}

/// Hostname of `origin`, used as the relying party id
pub fn relying_party_id(origin: &str) -> PasskeyResult<String> {
    let url = Url::parse(origin).map_err(|_| PasskeyIdentityError::Hostname(origin.to_string()))?;
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PasskeyIdentityError::Hostname(origin.to_string()))
}

// === OVERRIDES ===

/// Pins the relying party instead of deriving it from the origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppId {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationOverrides {
    pub app_id: Option<AppId>,
    /// User handle; a random one is generated when absent
    pub user_id: Option<Vec<u8>>,
    pub user_name: Option<String>,
    pub user_display_name: Option<String>,
    /// Credential ids the authenticator must not re-register
    pub exclude_credentials: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalOverrides {
    pub app_id: Option<AppId>,
    /// Empty for discoverable credential flows
    pub allow_credentials: Vec<Vec<u8>>,
}

// === BUILDERS ===

/// Fill `len` bytes from the OS random source
pub fn random_bytes(len: usize) -> PasskeyResult<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| PasskeyIdentityError::RandomSource(e.to_string()))?;
    Ok(bytes)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn resolve_relying_party(
    resolver: &impl OriginResolver,
    app_id: Option<&AppId>,
) -> PasskeyResult<RelyingParty> {
    if let Some(app_id) = app_id {
        return Ok(RelyingParty {
            id: app_id.id.clone(),
            name: app_id.name.clone(),
        });
    }

    let id = relying_party_id(&resolver.origin()?)?;
    let name = non_blank(resolver.title()).unwrap_or_else(|| id.clone());
    Ok(RelyingParty { id, name })
}

/// Options for `navigator.credentials.create`
pub fn build_registration_options(
    resolver: &impl OriginResolver,
    overrides: &RegistrationOverrides,
) -> PasskeyResult<PublicKeyCredentialCreationOptions> {
    let rp = resolve_relying_party(resolver, overrides.app_id.as_ref())?;

    let challenge = random_bytes(CHALLENGE_SIZE)?;
    let user_id = match &overrides.user_id {
        Some(id) => id.clone(),
        None => random_bytes(USER_HANDLE_SIZE)?,
    };

    let user_name = non_blank(overrides.user_name.clone())
        .or_else(|| non_blank(resolver.title()))
        .unwrap_or_else(|| rp.name.clone());
    let display_name =
        non_blank(overrides.user_display_name.clone()).unwrap_or_else(|| user_name.clone());

    debug!(
        "Registration options: rp.id={}, {} excluded credentials",
        rp.id,
        overrides.exclude_credentials.len()
    );

    Ok(PublicKeyCredentialCreationOptions {
        rp,
        user: UserEntity {
            id: user_id,
            name: user_name,
            display_name,
        },
        challenge,
        pub_key_cred_params: vec![
            PublicKeyCredentialParameters::public_key(COSE_ALG_ES256),
            PublicKeyCredentialParameters::public_key(COSE_ALG_RS256),
        ],
        authenticator_selection: AuthenticatorSelectionCriteria {
            authenticator_attachment: AuthenticatorAttachment::Platform,
            require_resident_key: true,
            resident_key: ResidentKeyRequirement::Required,
            user_verification: UserVerificationRequirement::Preferred,
        },
        attestation: AttestationConveyancePreference::Direct,
        exclude_credentials: overrides
            .exclude_credentials
            .iter()
            .cloned()
            .map(PublicKeyCredentialDescriptor::public_key)
            .collect(),
        timeout: None,
    })
}

/// Options for `navigator.credentials.get`. The challenge is passed through verbatim.
pub fn build_retrieval_options(
    resolver: &impl OriginResolver,
    challenge: &[u8],
    overrides: &RetrievalOverrides,
) -> PasskeyResult<PublicKeyCredentialRequestOptions> {
    let rp_id = match &overrides.app_id {
        Some(app_id) => app_id.id.clone(),
        None => relying_party_id(&resolver.origin()?)?,
    };

    Ok(PublicKeyCredentialRequestOptions {
        challenge: challenge.to_vec(),
        rp_id,
        allow_credentials: overrides
            .allow_credentials
            .iter()
            .cloned()
            .map(PublicKeyCredentialDescriptor::public_key)
            .collect(),
        user_verification: UserVerificationRequirement::Required,
        timeout: None,
    })
}
