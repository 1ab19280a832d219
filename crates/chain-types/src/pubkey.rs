use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use crate::error::CodecError;

/// A compressed secp256k1 public key, 33 bytes (spec §6 "public keys compressed").
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct PublicKeyBytes(#[serde(with = "BigArray")] pub [u8; 33]);

impl PublicKeyBytes {
    pub const LEN: usize = 33;

    /// The sentinel used by block-reward transactions, which carry no signer.
    pub const EMPTY: PublicKeyBytes = PublicKeyBytes([0u8; 33]);

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 33]
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != Self::LEN {
            return Err(CodecError::WrongLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; Self::LEN];
        out.copy_from_slice(bytes);
        Ok(PublicKeyBytes(out))
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyBytes({})", hex::encode(self.0))
    }
}

impl fmt::Display for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
