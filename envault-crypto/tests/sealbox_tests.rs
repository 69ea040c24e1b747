use envault_crypto::sealbox::{open, seal, DeviceKeyPair};
use envault_crypto::{fingerprint, CryptoError, SEALED_OVERHEAD};

#[test]
fn keypair_generation_produces_valid_keys() {
    let kp = DeviceKeyPair::generate();
    let pub_bytes = kp.public_bytes();
    let sec_bytes = kp.secret_bytes();
    assert_eq!(pub_bytes.len(), 32);
    assert_eq!(sec_bytes.len(), 32);
    // Public and secret keys must differ
    assert_ne!(pub_bytes, sec_bytes);
}

#[test]
fn keypair_roundtrip_from_secret_bytes() {
    let kp1 = DeviceKeyPair::generate();
    let kp2 = DeviceKeyPair::from_secret_bytes(kp1.secret_bytes());
    assert_eq!(kp1.public_bytes(), kp2.public_bytes());
    assert_eq!(kp1.secret_bytes(), kp2.secret_bytes());
}

#[test]
fn seal_open_roundtrip() {
    let recipient = DeviceKeyPair::generate();
    let dek = b"this-is-a-32-byte-data-encr-key!";

    let sealed = seal(dek, &recipient.public).unwrap();
    let recovered = open(&sealed, &recipient.secret).unwrap();

    assert_eq!(recovered, dek);
}

#[test]
fn seal_open_empty_message() {
    let recipient = DeviceKeyPair::generate();

    let sealed = seal(b"", &recipient.public).unwrap();
    assert_eq!(sealed.len(), SEALED_OVERHEAD);
    assert_eq!(open(&sealed, &recipient.secret).unwrap(), b"");
}

#[test]
fn wrong_recipient_key_fails_to_open() {
    let target = DeviceKeyPair::generate();
    let wrong = DeviceKeyPair::generate();
    let dek = b"secret-dek-material-1234567890ab";

    let sealed = seal(dek, &target.public).unwrap();
    assert!(matches!(
        open(&sealed, &wrong.secret),
        Err(CryptoError::Integrity)
    ));
}

#[test]
fn tampered_ciphertext_fails() {
    let recipient = DeviceKeyPair::generate();
    let mut sealed = seal(b"secret-dek-material-1234567890ab", &recipient.public).unwrap();
    let last = sealed.len() - 1;
    sealed[last] ^= 0xFF;

    assert!(matches!(
        open(&sealed, &recipient.secret),
        Err(CryptoError::Integrity)
    ));
}

#[test]
fn tampered_ephemeral_key_fails() {
    let recipient = DeviceKeyPair::generate();
    let mut sealed = seal(b"secret-dek-material-1234567890ab", &recipient.public).unwrap();
    sealed[0] ^= 0xFF;

    assert!(matches!(
        open(&sealed, &recipient.secret),
        Err(CryptoError::Integrity)
    ));
}

#[test]
fn truncated_input_fails() {
    let recipient = DeviceKeyPair::generate();
    let sealed = seal(b"dek", &recipient.public).unwrap();

    for len in [0, 31, 55, SEALED_OVERHEAD - 1] {
        assert!(matches!(
            open(&sealed[..len], &recipient.secret),
            Err(CryptoError::Integrity)
        ));
    }
}

#[test]
fn each_seal_produces_different_output() {
    let recipient = DeviceKeyPair::generate();
    let dek = b"same-dek-every-time-0123456789ab";

    let s1 = seal(dek, &recipient.public).unwrap();
    let s2 = seal(dek, &recipient.public).unwrap();

    // Different ephemeral keys and nonces
    assert_ne!(s1[..32], s2[..32]);
    assert_ne!(s1[32..56], s2[32..56]);

    // Both decrypt to the same DEK
    assert_eq!(open(&s1, &recipient.secret).unwrap(), dek);
    assert_eq!(open(&s2, &recipient.secret).unwrap(), dek);
}

#[test]
fn fingerprint_of_device_public_key() {
    let kp = DeviceKeyPair::generate();
    let fp = fingerprint(&kp.public_bytes());
    assert_eq!(fp.len(), 16);
    assert_eq!(fp, fingerprint(&kp.public_bytes()));
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn seal_open_always_roundtrips(msg in proptest::collection::vec(any::<u8>(), 0..256)) {
            let recipient = DeviceKeyPair::generate();
            let sealed = seal(&msg, &recipient.public).unwrap();
            let recovered = open(&sealed, &recipient.secret).unwrap();
            prop_assert_eq!(recovered, msg);
        }

        #[test]
        fn aead_always_roundtrips(msg in proptest::collection::vec(any::<u8>(), 0..512)) {
            let key = envault_crypto::DataKey::generate().unwrap();
            let encrypted = envault_crypto::encrypt(&key, &msg).unwrap();
            let decrypted = envault_crypto::decrypt(&key, &encrypted).unwrap();
            prop_assert_eq!(decrypted, msg);
        }
    }
}
