//! The undo log (spec §4.1): an ordered, tagged-variant list sufficient to
//! reverse every mutation a transaction made. Every variant pairs the key
//! that was touched with its previous overlay value — `None` means the key
//! had no prior value, so disconnecting forgets it outright rather than
//! restoring a tombstone.

use chain_types::{Hash256, Pkid, PublicKeyBytes};

use crate::entries::*;

#[derive(Clone, Debug, PartialEq)]
pub enum RoyaltyPayoutKind {
    CreatorDirect,
    CreatorCoin,
    AdditionalCreator,
    AdditionalCoin,
    Seller,
}

/// A single reversible effect. The dispatcher enum evolves in lockstep with
/// this one (spec §9 "Dispatch over transaction kinds").
#[derive(Clone, Debug, PartialEq)]
pub enum UndoOperation {
    SpentUtxo(UtxoKey, UtxoEntry),
    CreatedUtxo(UtxoKey),
    BalanceDelta(PublicKeyBytes, Option<u64>),

    PkidMappingChanged(PublicKeyBytes, Option<Pkid>),
    PkidReverseChanged(Pkid, Option<PublicKeyBytes>),

    ProfileChanged(Pkid, Option<ProfileEntry>),
    UsernameOwnerChanged(String, Option<Pkid>),
    BalanceEntryChanged(BalanceKey, bool, Option<BalanceEntry>),

    PostChanged(Hash256, Option<PostEntry>),
    LikeChanged(LikeKey, Option<LikeEntry>),
    FollowChanged(FollowKey, Option<FollowEntry>),
    RepostChanged(RepostKey, Option<RepostEntry>),
    DiamondChanged(DiamondKey, Option<DiamondEntry>),

    NftChanged(NftKey, Option<NFTEntry>),
    NftBidChanged(NftBidKey, Option<NFTBidEntry>),

    MessageChanged(MessageKey, Option<MessageEntry>),
    MessagingGroupChanged(MessagingGroupKey, Option<MessagingGroupEntry>),

    DerivedKeyChanged(DerivedKeyMapKey, Option<DerivedKeyEntry>),

    GlobalParamsChanged(GlobalParamsEntry),
    ForbiddenKeyInserted(PublicKeyBytes),
    BitcoinBurnSeenInserted(Hash256),

    /// Out-of-band accounting only; disconnect does not need to reverse
    /// these, but keeping them in the log lets an analytics consumer read
    /// exactly what an accept-bid distributed (spec §4.1 "auxiliary fields
    /// consumed only by external analytics").
    RoyaltyPayoutRecorded {
        recipient: Pkid,
        amount_base_units: u64,
        kind: RoyaltyPayoutKind,
    },
}

/// Every reversible effect one transaction produced, in the order Connect
/// applied them. Disconnect replays this `Vec` back-to-front.
pub type TxnUndo = Vec<UndoOperation>;

/// Apply `prior` back into an overlay slot: `Some` restores, `None` forgets
/// the key entirely (it never existed in the overlay before this mutation).
pub(crate) fn apply_prior<K, V>(overlay: &mut crate::store::Overlay<K, V>, key: K, prior: Option<V>)
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
{
    match prior {
        Some(v) => overlay.restore(key, v),
        None => overlay.forget(&key),
    }
}

impl crate::view::View {
    /// Replays one transaction's undo log back-to-front (spec §4.1
    /// "DisconnectTransaction is the exact inverse"). Every variant the
    /// dispatcher can produce is handled here in one place so the mapping
    /// from undo record to reversal stays exhaustive as new kinds are added.
    pub(crate) fn apply_undo_operations(&mut self, ops: Vec<UndoOperation>) -> Result<(), crate::errors::CorruptionError> {
        use crate::errors::CorruptionError;

        for op in ops.into_iter().rev() {
            match op {
                UndoOperation::SpentUtxo(key, prior) => {
                    if matches!(self.utxos.peek(&key), Some(entry) if !entry.spent) {
                        return Err(CorruptionError::UtxoAlreadyLive(key.txn_id, key.output_index));
                    }
                    self.utxos.restore(key, prior);
                }
                UndoOperation::CreatedUtxo(key) => {
                    self.utxos.forget(&key);
                }
                UndoOperation::BalanceDelta(owner, prior) => apply_prior(&mut self.balances, owner, prior),

                UndoOperation::PkidMappingChanged(key, prior) => apply_prior(&mut self.pkid_forward, key, prior),
                UndoOperation::PkidReverseChanged(pkid, prior) => apply_prior(&mut self.pkid_reverse, pkid, prior),

                UndoOperation::ProfileChanged(pkid, prior) => apply_prior(&mut self.profiles, pkid, prior),
                UndoOperation::UsernameOwnerChanged(name, prior) => apply_prior(&mut self.username_owners, name, prior),
                UndoOperation::BalanceEntryChanged(key, is_dao_coin, prior) => {
                    if is_dao_coin {
                        apply_prior(&mut self.dao_coin_balances, key, prior)
                    } else {
                        apply_prior(&mut self.creator_coin_balances, key, prior)
                    }
                }

                UndoOperation::PostChanged(hash, prior) => apply_prior(&mut self.posts, hash, prior),
                UndoOperation::LikeChanged(key, prior) => apply_prior(&mut self.likes, key, prior),
                UndoOperation::FollowChanged(key, prior) => apply_prior(&mut self.follows, key, prior),
                UndoOperation::RepostChanged(key, prior) => apply_prior(&mut self.reposts, key, prior),
                UndoOperation::DiamondChanged(key, prior) => apply_prior(&mut self.diamonds, key, prior),

                UndoOperation::NftChanged(key, prior) => apply_prior(&mut self.nfts, key, prior),
                UndoOperation::NftBidChanged(key, prior) => apply_prior(&mut self.nft_bids, key, prior),

                UndoOperation::MessageChanged(key, prior) => apply_prior(&mut self.messages, key, prior),
                UndoOperation::MessagingGroupChanged(key, prior) => apply_prior(&mut self.messaging_groups, key, prior),

                UndoOperation::DerivedKeyChanged(key, prior) => apply_prior(&mut self.derived_keys, key, prior),

                UndoOperation::GlobalParamsChanged(prior) => {
                    self.global_params_override = Some(prior);
                }
                UndoOperation::ForbiddenKeyInserted(key) => {
                    self.forbidden_keys.forget(&key);
                }
                UndoOperation::BitcoinBurnSeenInserted(burn_txn_id) => {
                    self.bitcoin_burns_seen.forget(&burn_txn_id);
                }

                // Analytics-only; nothing in the view to reverse.
                UndoOperation::RoyaltyPayoutRecorded { .. } => {}
            }
        }
        Ok(())
    }
}
