//! Overlay value types (spec §3 "DATA MODEL") and the keys that address them.
//!
//! Cyclic back-references are avoided the way spec §9 asks: every key is
//! stored as a plain value alongside its entry, never as a pointer back into
//! another table (mirrors `marketplace-onsocial`'s `TokenId`/`Scarce` split).

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use chain_types::{CoinAmount, Hash256, Pkid, PublicKeyBytes};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------
// UTXO set + balances
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct UtxoKey {
    pub txn_id: Hash256,
    pub output_index: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum UtxoOrigin {
    Ordinary,
    BlockReward,
    CrossChainBurn,
    CreatorCoinSale,
    CreatorCoinFounderReward,
    NftSellerProceeds,
    NftBidderChange,
    NftCreatorRoyalty,
    NftAdditionalRoyalty,
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub owner: PublicKeyBytes,
    pub amount_base_units: u64,
    pub block_height: u64,
    pub origin: UtxoOrigin,
    /// Overlay-only: distinguishes a live entry from a tombstone while the
    /// soft-delete is still pending flush (spec §3).
    pub spent: bool,
}

impl UtxoEntry {
    pub fn is_block_reward(&self) -> bool {
        matches!(self.origin, UtxoOrigin::BlockReward)
    }
}

// ---------------------------------------------------------------------
// Identity (PKID)
// ---------------------------------------------------------------------

// No dedicated entry type: the mapping is `PublicKeyBytes -> Pkid` and the
// reverse `Pkid -> PublicKeyBytes`, both held directly in `View`.

// ---------------------------------------------------------------------
// Profile / creator-coin / DAO-coin
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum TransferRestrictionStatus {
    Unrestricted,
    OwnerOnly,
    HoldersOnly,
    PermanentlyUnrestricted,
}

impl TransferRestrictionStatus {
    /// `PermanentlyUnrestricted` is an absorbing state (spec §4.3 state
    /// machine for transfer restriction).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferRestrictionStatus::PermanentlyUnrestricted)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct CoinEntry {
    pub founder_basis_points: u32,
    pub native_token_reserve_base_units: u64,
    pub num_holders: u64,
    pub coins_in_circulation: CoinAmount,
    pub circulation_watermark: CoinAmount,
    pub minting_disabled: bool,
    pub transfer_restriction: TransferRestrictionStatus,
}

impl CoinEntry {
    pub fn new_creator_coin() -> Self {
        CoinEntry {
            founder_basis_points: 0,
            native_token_reserve_base_units: 0,
            num_holders: 0,
            coins_in_circulation: CoinAmount::ZERO,
            circulation_watermark: CoinAmount::ZERO,
            minting_disabled: false,
            transfer_restriction: TransferRestrictionStatus::Unrestricted,
        }
    }

    pub fn new_dao_coin() -> Self {
        CoinEntry {
            founder_basis_points: 0,
            native_token_reserve_base_units: 0,
            num_holders: 0,
            coins_in_circulation: CoinAmount::ZERO,
            circulation_watermark: CoinAmount::ZERO,
            minting_disabled: false,
            transfer_restriction: TransferRestrictionStatus::Unrestricted,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub public_key: PublicKeyBytes,
    pub username: String,
    pub description: String,
    pub profile_image: Vec<u8>,
    pub hidden: bool,
    pub creator_coin: CoinEntry,
    pub dao_coin: CoinEntry,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BalanceKey {
    pub holder: Pkid,
    pub creator: Pkid,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub balance: CoinAmount,
    pub has_purchased: bool,
}

impl BalanceEntry {
    pub fn zero() -> Self {
        BalanceEntry {
            balance: CoinAmount::ZERO,
            has_purchased: false,
        }
    }
}

// ---------------------------------------------------------------------
// Posts / social graph
// ---------------------------------------------------------------------

#[derive(Clone, Eq, PartialEq, Debug, Default, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct PostNftMetadata {
    pub is_nft: bool,
    pub num_copies: u64,
    pub num_copies_for_sale: u64,
    pub num_copies_burned: u64,
    pub has_unlockable: bool,
    pub creator_royalty_basis_points: u32,
    pub coin_royalty_basis_points: u32,
    pub additional_creator_royalties_basis_points: BTreeMap<Pkid, u32>,
    pub additional_coin_royalties_basis_points: BTreeMap<Pkid, u32>,
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct PostEntry {
    pub post_hash: Hash256,
    pub author: Pkid,
    pub content: Vec<u8>,
    pub parent_post_hash: Option<Hash256>,
    pub reposted_post_hash: Option<Hash256>,
    pub like_count: u64,
    pub repost_count: u64,
    pub quote_repost_count: u64,
    pub comment_count: u64,
    pub diamond_count: u64,
    pub timestamp_nanos: u64,
    pub hidden: bool,
    pub pinned: bool,
    pub nft: PostNftMetadata,
    pub extra_data: BTreeMap<String, Vec<u8>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct LikeKey {
    pub liker: Pkid,
    pub liked_post: Hash256,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct LikeEntry {
    pub liker: Pkid,
    pub liked_post: Hash256,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct FollowKey {
    pub follower: Pkid,
    pub followed: Pkid,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct FollowEntry {
    pub follower: Pkid,
    pub followed: Pkid,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct RepostKey {
    pub reposter: Pkid,
    pub reposted_post: Hash256,
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct RepostEntry {
    pub reposter: Pkid,
    pub reposted_post: Hash256,
    pub repost_post_hash: Hash256,
    pub is_quote_repost: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct DiamondKey {
    pub sender: Pkid,
    pub receiver: Pkid,
    pub diamond_post_hash: Hash256,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct DiamondEntry {
    pub sender: Pkid,
    pub receiver: Pkid,
    pub diamond_post_hash: Hash256,
    pub diamond_level: u8,
}

// ---------------------------------------------------------------------
// NFTs
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct NftKey {
    pub post_hash: Hash256,
    pub serial_number: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct NFTEntry {
    pub post_hash: Hash256,
    pub serial_number: u64,
    pub owner: Pkid,
    pub last_owner: Pkid,
    pub is_for_sale: bool,
    pub min_bid_amount_base_units: u64,
    pub last_accepted_bid_amount_base_units: u64,
    pub is_pending: bool,
    pub is_buy_now: bool,
    pub buy_now_price_base_units: u64,
    pub unlockable_ciphertext: Vec<u8>,
    pub accepted_bid_history: Vec<u64>,
    pub burned: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct NftBidKey {
    pub bidder: Pkid,
    pub post_hash: Hash256,
    pub serial_number: u64,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct NFTBidEntry {
    pub bidder: Pkid,
    pub post_hash: Hash256,
    pub serial_number: u64,
    pub bid_amount_base_units: u64,
}

// ---------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[borsh(use_discriminant = true)]
pub enum MessageVersion {
    RawPublicKey = 1,
    SharedSecret = 2,
    Group = 3,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct MessageKey {
    pub recipient: Pkid,
    pub timestamp_nanos: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct MessageEntry {
    pub sender: Pkid,
    pub recipient: Pkid,
    pub ciphertext: Vec<u8>,
    pub timestamp_nanos: u64,
    pub version: MessageVersion,
    pub sender_messaging_public_key: Option<PublicKeyBytes>,
    pub recipient_messaging_public_key: Option<PublicKeyBytes>,
    pub sender_messaging_group_key_name: Option<Vec<u8>>,
    pub recipient_messaging_group_key_name: Option<Vec<u8>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct MessagingGroupKey {
    pub owner: Pkid,
    /// Padded, fixed-width wire form (spec §3: "two names equal iff their
    /// padded forms equal").
    pub group_key_name_padded: [u8; crate::constants::MESSAGING_GROUP_NAME_WIRE_WIDTH],
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct MessagingGroupMember {
    pub member: Pkid,
    pub encrypted_group_private_key: Vec<u8>,
}

#[derive(Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct MessagingGroupEntry {
    pub owner: Pkid,
    pub group_key_name_padded: [u8; crate::constants::MESSAGING_GROUP_NAME_WIRE_WIDTH],
    pub group_messaging_public_key: PublicKeyBytes,
    pub members: Vec<MessagingGroupMember>,
}

// ---------------------------------------------------------------------
// Derived keys
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum DerivedKeyAuthorizationState {
    Valid,
    Revoked,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct DerivedKeyMapKey {
    pub owner: PublicKeyBytes,
    pub derived: PublicKeyBytes,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct DerivedKeyEntry {
    pub owner: PublicKeyBytes,
    pub derived: PublicKeyBytes,
    pub expiration_block: u64,
    pub state: DerivedKeyAuthorizationState,
}

impl DerivedKeyEntry {
    pub fn is_usable_at(&self, height: u64) -> bool {
        matches!(self.state, DerivedKeyAuthorizationState::Valid) && height <= self.expiration_block
    }
}

// ---------------------------------------------------------------------
// Global params / forbidden keys
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct GlobalParamsEntry {
    pub usd_cents_per_native_unit: u64,
    pub profile_creation_fee_base_units: u64,
    pub nft_creation_fee_base_units: u64,
    pub max_nft_copies: u64,
    pub min_network_fee_per_kb_base_units: u64,
}

impl Default for GlobalParamsEntry {
    fn default() -> Self {
        GlobalParamsEntry {
            usd_cents_per_native_unit: crate::constants::DEFAULT_EXCHANGE_RATE_CENTS_PER_UNIT,
            profile_creation_fee_base_units: crate::constants::DEFAULT_PROFILE_CREATION_FEE_BASE_UNITS,
            nft_creation_fee_base_units: crate::constants::DEFAULT_NFT_CREATION_FEE_BASE_UNITS,
            max_nft_copies: crate::constants::DEFAULT_MAX_NFT_COPIES,
            min_network_fee_per_kb_base_units: crate::constants::DEFAULT_MIN_FEE_PER_KB_BASE_UNITS,
        }
    }
}
