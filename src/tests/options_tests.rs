use crate::error::{ErrorKind, PasskeyIdentityError};
use crate::options::*;
use crate::tests::TEST_ORIGIN;
use crate::types::webauthn::*;

fn app_id() -> AppId {
    AppId {
        id: "example.com".to_string(),
        name: "Example Wallet".to_string(),
    }
}

#[test]
fn test_relying_party_id_is_hostname() {
    assert_eq!(relying_party_id(TEST_ORIGIN).unwrap(), "wallet.example.com");
    assert_eq!(relying_party_id("http://localhost:5173").unwrap(), "localhost");
}

#[test]
fn test_relying_party_id_rejects_unparseable_origin() {
    let err = relying_party_id("not an origin").unwrap_err();
    assert_eq!(err, PasskeyIdentityError::Hostname("not an origin".to_string()));
    assert_eq!(err.kind(), ErrorKind::Environment);

    assert!(relying_party_id("data:text/plain,hello").is_err());
}

#[test]
fn test_registration_defaults() {
    let origin = StaticOrigin::new(TEST_ORIGIN).with_title("My Wallet");
    let options = build_registration_options(&origin, &RegistrationOverrides::default()).unwrap();

    assert_eq!(options.rp.id, "wallet.example.com");
    assert_eq!(options.rp.name, "My Wallet");
    assert_eq!(options.challenge.len(), 16);
    assert_eq!(options.user.id.len(), 16);
    assert_eq!(options.user.name, "My Wallet");
    assert_eq!(options.user.display_name, "My Wallet");
    assert_eq!(options.attestation, AttestationConveyancePreference::Direct);
    assert_eq!(
        options.pub_key_cred_params,
        vec![
            PublicKeyCredentialParameters::public_key(-7),
            PublicKeyCredentialParameters::public_key(-257),
        ]
    );
    assert_eq!(
        options.authenticator_selection,
        AuthenticatorSelectionCriteria {
            authenticator_attachment: AuthenticatorAttachment::Platform,
            require_resident_key: true,
            resident_key: ResidentKeyRequirement::Required,
            user_verification: UserVerificationRequirement::Preferred,
        }
    );
    assert!(options.exclude_credentials.is_empty());
}

#[test]
fn test_registration_challenges_are_fresh() {
    let origin = StaticOrigin::new(TEST_ORIGIN);
    let first = build_registration_options(&origin, &RegistrationOverrides::default()).unwrap();
    let second = build_registration_options(&origin, &RegistrationOverrides::default()).unwrap();
    assert_ne!(first.challenge, second.challenge);
    assert_ne!(first.user.id, second.user.id);
}

#[test]
fn test_registration_name_falls_back_to_rp_id() {
    let origin = StaticOrigin::new(TEST_ORIGIN).with_title("   ");
    let options = build_registration_options(&origin, &RegistrationOverrides::default()).unwrap();
    assert_eq!(options.rp.name, "wallet.example.com");
    assert_eq!(options.user.name, "wallet.example.com");
}

#[test]
fn test_registration_overrides() {
    let overrides = RegistrationOverrides {
        app_id: Some(app_id()),
        user_id: Some(vec![9u8; 8]),
        user_name: Some("alice".to_string()),
        user_display_name: Some("Alice".to_string()),
        exclude_credentials: vec![vec![1, 2, 3]],
    };
    // The origin is never consulted when the relying party is pinned
    let origin = StaticOrigin::new("not an origin");
    let options = build_registration_options(&origin, &overrides).unwrap();

    assert_eq!(options.rp, RelyingParty {
        id: "example.com".to_string(),
        name: "Example Wallet".to_string(),
    });
    assert_eq!(options.user.id, vec![9u8; 8]);
    assert_eq!(options.user.name, "alice");
    assert_eq!(options.user.display_name, "Alice");
    assert_eq!(
        options.exclude_credentials,
        vec![PublicKeyCredentialDescriptor::public_key(vec![1, 2, 3])]
    );
}

#[test]
fn test_registration_fails_on_bad_origin() {
    let origin = StaticOrigin::new("::");
    let err = build_registration_options(&origin, &RegistrationOverrides::default()).unwrap_err();
    assert!(matches!(err, PasskeyIdentityError::Hostname(_)));
}

#[test]
fn test_retrieval_options() {
    let origin = StaticOrigin::new(TEST_ORIGIN);
    let overrides = RetrievalOverrides {
        app_id: None,
        allow_credentials: vec![vec![0x42u8; 4]],
    };
    let options = build_retrieval_options(&origin, b"challenge", &overrides).unwrap();

    assert_eq!(options.challenge, b"challenge".to_vec());
    assert_eq!(options.rp_id, "wallet.example.com");
    assert_eq!(options.user_verification, UserVerificationRequirement::Required);
    assert_eq!(options.allow_credentials.len(), 1);
    assert_eq!(options.allow_credentials[0].id, vec![0x42u8; 4]);
    assert_eq!(options.allow_credentials[0].credential_type, "public-key");
}

#[test]
fn test_retrieval_options_with_app_id() {
    let origin = StaticOrigin::new("not an origin");
    let overrides = RetrievalOverrides {
        app_id: Some(app_id()),
        allow_credentials: Vec::new(),
    };
    let options = build_retrieval_options(&origin, &[1, 2, 3], &overrides).unwrap();
    assert_eq!(options.rp_id, "example.com");
    assert!(options.allow_credentials.is_empty());
}

#[test]
fn test_creation_options_json_shape() {
    let origin = StaticOrigin::new(TEST_ORIGIN).with_title("My Wallet");
    let mut options =
        build_registration_options(&origin, &RegistrationOverrides::default()).unwrap();
    options.timeout = Some(60_000);
    let json = serde_json::to_value(&options).unwrap();

    assert_eq!(json["rp"]["id"], "wallet.example.com");
    assert_eq!(json["user"]["displayName"], "My Wallet");
    assert_eq!(json["pubKeyCredParams"][0]["type"], "public-key");
    assert_eq!(json["pubKeyCredParams"][0]["alg"], -7);
    assert_eq!(json["pubKeyCredParams"][1]["alg"], -257);
    assert_eq!(
        json["authenticatorSelection"]["authenticatorAttachment"],
        "platform"
    );
    assert_eq!(json["authenticatorSelection"]["requireResidentKey"], true);
    assert_eq!(json["authenticatorSelection"]["residentKey"], "required");
    assert_eq!(json["authenticatorSelection"]["userVerification"], "preferred");
    assert_eq!(json["attestation"], "direct");
    assert_eq!(json["excludeCredentials"], serde_json::json!([]));
    assert_eq!(json["timeout"], 60_000);
    assert_eq!(json["challenge"].as_array().unwrap().len(), 16);
}

#[test]
fn test_request_options_json_shape() {
    let origin = StaticOrigin::new(TEST_ORIGIN);
    let overrides = RetrievalOverrides {
        app_id: None,
        allow_credentials: vec![vec![1, 2]],
    };
    let options = build_retrieval_options(&origin, &[7, 8], &overrides).unwrap();
    let json = serde_json::to_value(&options).unwrap();

    assert_eq!(json["rpId"], "wallet.example.com");
    assert_eq!(json["userVerification"], "required");
    assert_eq!(json["challenge"], serde_json::json!([7, 8]));
    assert_eq!(
        json["allowCredentials"],
        serde_json::json!([{ "type": "public-key", "id": [1, 2] }])
    );
    // Unset timeout is omitted rather than sent as null
    assert!(json.get("timeout").is_none());
}
