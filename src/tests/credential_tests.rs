use crate::cose::CosePublicKey;
use crate::credential::*;
use crate::tests::{mock_auth_data, mock_cose_key, TEST_AAGUID};

#[test]
fn test_new_credential_exposes_aaguid() {
    let credential_id = vec![0x42u8; 32];
    let auth_data = mock_auth_data(TEST_AAGUID, &credential_id, &mock_cose_key());
    let credential = NewCredential::new(credential_id.clone(), mock_cose_key(), auth_data.clone())
        .unwrap();

    assert_eq!(
        credential.aaguid().as_deref(),
        Some("00112233-4455-6677-8899-aabbccddeeff")
    );
    assert_eq!(credential.authenticator_data(), auth_data.as_slice());
    assert_eq!(credential.credential_id(), credential_id.as_slice());
}

#[test]
fn test_new_credential_aaguid_collapses_to_none() {
    let zero = mock_auth_data([0u8; 16], &[1u8; 8], &mock_cose_key());
    let credential = NewCredential::new(vec![1u8; 8], mock_cose_key(), zero).unwrap();
    assert_eq!(credential.aaguid(), None);

    let truncated = NewCredential::new(vec![1u8; 8], mock_cose_key(), vec![0u8; 40]).unwrap();
    assert_eq!(truncated.aaguid(), None);
}

#[test]
fn test_credential_id_text_is_standard_base64() {
    let credential: WebAuthnCredential =
        ExistingCredential::new(vec![0xfb, 0xff, 0x01], mock_cose_key())
            .unwrap()
            .into();
    assert_eq!(credential.credential_id_text(), "+/8B");
    assert_eq!(credential.credential_id(), &[0xfbu8, 0xff, 0x01][..]);
}

#[test]
fn test_public_key_is_der_wrapped_cose() {
    let credential: WebAuthnCredential =
        ExistingCredential::new(vec![7u8; 4], mock_cose_key()).unwrap().into();
    let expected = CosePublicKey::new(mock_cose_key()).unwrap();
    assert_eq!(credential.public_key(), &expected);
    assert_eq!(credential.public_key().to_raw()[0], 0x30);
}

#[test]
fn test_as_new_distinguishes_flavors() {
    let new_credential: WebAuthnCredential = NewCredential::new(
        vec![1u8; 16],
        mock_cose_key(),
        mock_auth_data(TEST_AAGUID, &[1u8; 16], &mock_cose_key()),
    )
    .unwrap()
    .into();
    assert!(new_credential.as_new().is_some());

    let existing: WebAuthnCredential = ExistingCredential::from_public_key(
        vec![1u8; 16],
        CosePublicKey::new(mock_cose_key()).unwrap(),
    )
    .into();
    assert!(existing.as_new().is_none());
}
