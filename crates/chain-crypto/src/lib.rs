//! The cryptography collaborator (spec §6): `parsePublicKey`, `verify`, and
//! the canonical transaction digest. Treated as a pure-function boundary the
//! view calls synchronously — it owns no chain state of its own, mirroring
//! `onsocial-auth::verify::verify_signature` and
//! `onsocial-types::crypto::ed25519_public_key_bytes`, generalized away from
//! NEAR's host functions to a plain library call.
//!
//! `PublicKeyBytes` (chain-types) is laid out as a one-byte curve tag
//! followed by the 32 raw ed25519 public key bytes, the same 33-byte shape
//! `onsocial-types` extracts from a NEAR `PublicKey`.

use chain_types::{Hash256, PublicKeyBytes};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("public key bytes are not a valid ed25519 point")]
    MalformedPublicKey,
    #[error("signature bytes are not well-formed")]
    MalformedSignature,
}

/// Double-SHA-256 of the transaction's canonical serialization with its
/// signature field cleared (spec §6).
pub fn transaction_digest(canonical_bytes_with_empty_signature: &[u8]) -> Hash256 {
    let first = Sha256::digest(canonical_bytes_with_empty_signature);
    let second = Sha256::digest(first);
    Hash256(second.into())
}

fn parse_public_key(key: &PublicKeyBytes) -> Result<VerifyingKey, CryptoError> {
    let raw: [u8; 32] = key.as_bytes()[1..]
        .try_into()
        .map_err(|_| CryptoError::MalformedPublicKey)?;
    VerifyingKey::from_bytes(&raw).map_err(|_| CryptoError::MalformedPublicKey)
}

/// `verify(signature, messageDigest, key) -> bool` from spec §6, except
/// malformed inputs surface as an error instead of silently returning
/// `false` so callers can distinguish "rejected" from "garbage".
pub fn verify(signature: &[u8], digest: &Hash256, key: &PublicKeyBytes) -> Result<bool, CryptoError> {
    let verifying_key = parse_public_key(key)?;
    let sig_bytes: [u8; 64] = signature
        .try_into()
        .map_err(|_| CryptoError::MalformedSignature)?;
    let signature = Signature::from_bytes(&sig_bytes);
    Ok(verifying_key.verify(digest.as_bytes(), &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{SigningKey, Signer};
    use rand::rngs::OsRng;

    fn public_key_bytes(verifying: &VerifyingKey) -> PublicKeyBytes {
        let mut out = [0u8; 33];
        out[0] = 0; // curve tag: ed25519
        out[1..].copy_from_slice(verifying.as_bytes());
        PublicKeyBytes(out)
    }

    #[test]
    fn valid_signature_verifies() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let digest = transaction_digest(b"a transaction with its signature field zeroed");
        let signature = signing_key.sign(digest.as_bytes());
        let pk = public_key_bytes(&signing_key.verifying_key());
        assert!(verify(&signature.to_bytes(), &digest, &pk).unwrap());
    }

    #[test]
    fn tampered_digest_fails() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let digest = transaction_digest(b"original bytes");
        let other_digest = transaction_digest(b"tampered bytes");
        let signature = signing_key.sign(digest.as_bytes());
        let pk = public_key_bytes(&signing_key.verifying_key());
        assert!(!verify(&signature.to_bytes(), &other_digest, &pk).unwrap());
    }

    #[test]
    fn malformed_signature_length_is_an_error_not_a_panic() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let digest = transaction_digest(b"x");
        let pk = public_key_bytes(&signing_key.verifying_key());
        assert_eq!(
            verify(&[0u8; 10], &digest, &pk),
            Err(CryptoError::MalformedSignature)
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let a = transaction_digest(b"same bytes");
        let b = transaction_digest(b"same bytes");
        assert_eq!(a, b);
    }
}
