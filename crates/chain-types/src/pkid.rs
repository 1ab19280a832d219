use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use crate::pubkey::PublicKeyBytes;

/// A permanent, opaque account handle (spec §3 "Stable identifier (PKID)").
///
/// Identical to the owning public key's compressed bytes at creation, but the
/// mapping is mutable afterward (`SwapIdentity`) — never read a `Pkid` as if
/// it were still a signing key.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Pkid(#[serde(with = "BigArray")] pub [u8; 33]);

impl Pkid {
    pub const LEN: usize = 33;

    /// A PKID is only ever minted from the public key seen the first time an
    /// account touches the view; after that the two are tracked independently.
    pub fn from_public_key(key: &PublicKeyBytes) -> Self {
        Pkid(*key.as_bytes())
    }
}

impl fmt::Debug for Pkid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pkid({})", hex::encode(self.0))
    }
}

impl fmt::Display for Pkid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
