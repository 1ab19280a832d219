//! The wire shape of a transaction as the view sees it (spec §6 "Transaction
//! wire format") and the dispatch tag (spec §9 "Dispatch over transaction
//! kinds": "a tagged enumeration with exhaustive match is preferred over
//! dynamic dispatch").
//!
//! Decoding raw bytes into this shape is a collaborator concern (spec §6);
//! the view only ever receives an already-parsed `Transaction`.

use std::collections::BTreeMap;

use chain_types::{Hash256, Pkid, PublicKeyBytes};

use crate::entries::{DerivedKeyAuthorizationState, MessageVersion, TransferRestrictionStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxnInput {
    pub txn_id: Hash256,
    pub output_index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxnOutput {
    pub owner: PublicKeyBytes,
    pub amount_base_units: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreatorCoinOperation {
    Buy,
    Sell,
    AddNativeTokens,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DaoCoinOperation {
    Mint,
    Burn,
    DisableMinting,
}

/// Kind-specific fields (spec §4.3). `BasicTransferOnly` covers the bare
/// native-token-movement transaction that has no handler beyond the
/// prologue/epilogue itself.
#[derive(Clone, Debug, PartialEq)]
pub enum TxnBody {
    BlockReward,
    BasicTransferOnly,

    BitcoinExchange {
        burn_txn_id: Hash256,
        native_tokens_to_mint_base_units: u64,
    },
    UpdateBitcoinUsdExchangeRate {
        usd_cents_per_native_unit: u64,
    },
    UpdateGlobalParams {
        fields: BTreeMap<String, u64>,
        forbid_key: Option<PublicKeyBytes>,
    },

    PrivateMessage {
        recipient: Pkid,
        ciphertext: Vec<u8>,
        timestamp_nanos: u64,
        version: MessageVersion,
        sender_messaging_public_key: Option<PublicKeyBytes>,
        recipient_messaging_public_key: Option<PublicKeyBytes>,
        sender_messaging_group_key_name: Option<Vec<u8>>,
        recipient_messaging_group_key_name: Option<Vec<u8>>,
    },
    MessagingGroup {
        group_key_name: Vec<u8>,
        group_messaging_public_key: PublicKeyBytes,
        new_members: Vec<(Pkid, Vec<u8>)>,
    },

    SubmitPost {
        post_hash: Hash256,
        parent_post_hash: Option<Hash256>,
        reposted_post_hash: Option<Hash256>,
        content: Vec<u8>,
        timestamp_nanos: u64,
        hidden: bool,
        pinned: bool,
        extra_data: BTreeMap<String, Vec<u8>>,
    },
    UpdateProfile {
        username: String,
        description: String,
        profile_image: Vec<u8>,
        hidden: bool,
    },

    Follow {
        followed: Pkid,
        is_unfollow: bool,
    },
    Like {
        liked_post: Hash256,
        is_unlike: bool,
    },
    Repost {
        reposted_post: Hash256,
        repost_post_hash: Hash256,
        is_quote_repost: bool,
        is_undo: bool,
    },

    CreatorCoin {
        creator: Pkid,
        operation: CreatorCoinOperation,
        native_tokens_base_units: u64,
        coins_to_sell: chain_types::CoinAmount,
        min_coins_expected: chain_types::CoinAmount,
        min_native_tokens_expected_base_units: u64,
        founder_basis_points: Option<u32>,
    },
    CreatorCoinTransfer {
        creator: Pkid,
        recipient: Pkid,
        amount: chain_types::CoinAmount,
    },

    DaoCoin {
        operation: DaoCoinOperation,
        amount: chain_types::CoinAmount,
        transfer_restriction: Option<TransferRestrictionStatus>,
    },
    DaoCoinTransfer {
        creator: Pkid,
        recipient: Pkid,
        amount: chain_types::CoinAmount,
    },

    SwapIdentity {
        from: Pkid,
        to: Pkid,
    },

    CreateNft {
        post_hash: Hash256,
        num_copies: u64,
        has_unlockable: bool,
        is_for_sale: bool,
        min_bid_amount_base_units: u64,
        creator_royalty_basis_points: u32,
        coin_royalty_basis_points: u32,
        additional_creator_royalties_basis_points: BTreeMap<Pkid, u32>,
        additional_coin_royalties_basis_points: BTreeMap<Pkid, u32>,
    },
    UpdateNft {
        post_hash: Hash256,
        serial_number: u64,
        is_for_sale: bool,
        min_bid_amount_base_units: u64,
        is_buy_now: bool,
        buy_now_price_base_units: u64,
    },
    NftBid {
        post_hash: Hash256,
        serial_number: u64,
        bid_amount_base_units: u64,
    },
    AcceptNftBid {
        post_hash: Hash256,
        serial_number: u64,
        bidder: Pkid,
        unlockable_ciphertext: Vec<u8>,
    },
    NftTransfer {
        post_hash: Hash256,
        serial_number: u64,
        receiver: Pkid,
        unlockable_ciphertext: Vec<u8>,
    },
    AcceptNftTransfer {
        post_hash: Hash256,
        serial_number: u64,
    },
    BurnNft {
        post_hash: Hash256,
        serial_number: u64,
    },

    AuthorizeDerivedKey {
        derived_public_key: PublicKeyBytes,
        expiration_block: u64,
        state: DerivedKeyAuthorizationState,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub txn_id: Hash256,
    pub public_key: PublicKeyBytes,
    pub inputs: Vec<TxnInput>,
    pub outputs: Vec<TxnOutput>,
    pub signature: Option<Vec<u8>>,
    /// Present when the signer authenticated with a delegated key rather
    /// than the account's own (spec §4.2 "BasicTransfer" signature clause).
    pub derived_public_key: Option<PublicKeyBytes>,
    /// Diamond side-effect fields, read by `BasicTransfer` regardless of
    /// `body` (spec §4.2: "a basic transfer carrying a diamond post hash and
    /// diamond level in extra-data").
    pub diamond_post_hash: Option<Hash256>,
    pub diamond_level: Option<u8>,
    pub body: TxnBody,
}

impl Transaction {
    pub fn is_block_reward(&self) -> bool {
        matches!(self.body, TxnBody::BlockReward)
    }
}
