//! Shared value types and wire codec for the social-chain-view core.
//!
//! Pure logic, no chain-runtime dependency — mirrors the split the rest of
//! the protocol uses for its dependency-light shared crate.

pub mod amount;
pub mod coin_amount;
pub mod error;
pub mod hash;
pub mod pkid;
pub mod pubkey;
pub mod wire;

pub use amount::{checked_add_capped, checked_sub, fee_meets_floor};
pub use coin_amount::CoinAmount;
pub use error::CodecError;
pub use hash::Hash256;
pub use pkid::Pkid;
pub use pubkey::PublicKeyBytes;
