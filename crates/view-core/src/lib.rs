//! The state-transition core: a single mutable `View` over an overlay cache
//! plus a read-only `ChainStore` backing collaborator, and the exhaustive
//! `ConnectTransaction`/`ConnectBlock` dispatch that mutates it (spec §2,
//! §4.1, §9). Each submodule is one `impl View` block, the way
//! `marketplace-onsocial` spreads `impl Contract` across per-feature files.

mod basic_transfer;
mod block;
mod constants;
mod creator_coin;
mod dao_coin;
mod derived_key;
mod dispatch;
mod entries;
mod errors;
mod global_params;
mod identity;
mod messaging;
mod nft;
mod posts;
mod profile;
mod social_graph;
mod store;
mod txn;
mod undo;
mod view;

pub use block::{BlockConnectOutcome, SizedTransaction};
pub use constants::{base_reward, block_reward_maturity_confirmations, BASIS_POINTS_DENOMINATOR, MAX_BLOCK_SIZE_BYTES, MAX_TXN_SIZE_BYTES};
pub use dispatch::TxnConnectOutcome;
pub use entries::{
    BalanceEntry, BalanceKey, CoinEntry, DerivedKeyAuthorizationState, DerivedKeyEntry, DerivedKeyMapKey, DiamondEntry, DiamondKey, FollowEntry,
    FollowKey, GlobalParamsEntry, LikeEntry, LikeKey, MessageEntry, MessageKey, MessageVersion, MessagingGroupEntry, MessagingGroupKey,
    MessagingGroupMember, NFTBidEntry, NFTEntry, NftBidKey, NftKey, PostEntry, PostNftMetadata, ProfileEntry, RepostEntry, RepostKey,
    TransferRestrictionStatus, UtxoEntry, UtxoKey, UtxoOrigin,
};
pub use errors::{CorruptionError, RuleError};
pub use store::{ChainStore, NullStore, Overlay, Slot};
pub use txn::{CreatorCoinOperation, DaoCoinOperation, Transaction, TxnBody, TxnInput, TxnOutput};
pub use undo::{RoyaltyPayoutKind, TxnUndo, UndoOperation};
pub use view::View;
