//! The overlay cache and the backing-store collaborator boundary (spec §6).
//!
//! The view never talks to durable storage directly; it resolves a read by
//! checking its own overlay first, then falling back to whatever
//! `ChainStore` implementation the host wires in. The core ships only a
//! `NullStore` (an always-empty genesis store) — a real backing store is
//! explicitly out of scope (spec §1).

use std::collections::HashMap;
use std::hash::Hash;

use chain_types::Pkid;

use crate::entries::*;

/// A single overlay slot: `Some(v)` means live (possibly freshly created or
/// mutated), `None` means soft-deleted. Absence of the key from the map means
/// "not yet resolved — ask the backing store" (spec §9 "Soft-delete
/// semantics").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot<V> {
    Live(V),
    Deleted,
}

/// A write-through overlay above a `ChainStore` (spec §3, §9).
#[derive(Clone, Debug)]
pub struct Overlay<K, V> {
    entries: HashMap<K, Slot<V>>,
}

impl<K, V> Default for Overlay<K, V> {
    fn default() -> Self {
        Overlay { entries: HashMap::new() }
    }
}

impl<K, V> Overlay<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Overlay {
            entries: HashMap::with_capacity(n),
        }
    }

    /// Resolve a read: overlay first, backing store on a cache miss. The
    /// fetched value (if any) is cached so a repeated read within the same
    /// block doesn't hit the store twice.
    pub fn get<F>(&mut self, key: &K, fetch_backing: F) -> Option<&V>
    where
        F: FnOnce() -> Option<V>,
    {
        if !self.entries.contains_key(key) {
            if let Some(fetched) = fetch_backing() {
                self.entries.insert(key.clone(), Slot::Live(fetched));
            }
        }
        match self.entries.get(key) {
            Some(Slot::Live(v)) => Some(v),
            Some(Slot::Deleted) | None => None,
        }
    }

    /// Read-only peek at whatever the overlay itself holds, without
    /// consulting the backing store. Used by handlers that already pulled
    /// the entry via `get` and need a second look without re-fetching.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match self.entries.get(key) {
            Some(Slot::Live(v)) => Some(v),
            _ => None,
        }
    }

    pub fn put(&mut self, key: K, value: V) {
        self.entries.insert(key, Slot::Live(value));
    }

    /// Soft-delete: the value is hidden from `get`/`peek` until a real flush
    /// would remove it from the backing store. Disconnect can always undo
    /// this with `restore`.
    pub fn delete(&mut self, key: K) {
        self.entries.insert(key, Slot::Deleted);
    }

    pub fn restore(&mut self, key: K, value: V) {
        self.entries.insert(key, Slot::Live(value));
    }

    /// Forget an overlay mutation entirely, reverting to "ask the backing
    /// store" — used to undo a handler that created an entry with no prior
    /// backing-store value.
    pub fn forget(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn touched(&self) -> impl Iterator<Item = (&K, &Slot<V>)> {
        self.entries.iter()
    }

    pub fn len_touched(&self) -> usize {
        self.entries.len()
    }
}

/// The backing store collaborator (spec §6): two read operations per
/// sub-ledger and one `flush`, which is outside the core's scope and so not
/// modeled here beyond the trait boundary that a real implementation would
/// hang off of.
pub trait ChainStore {
    fn fetch_utxo(&self, key: &UtxoKey) -> Option<UtxoEntry>;
    fn fetch_balance(&self, public_key: &chain_types::PublicKeyBytes) -> u64;
    fn fetch_pkid(&self, public_key: &chain_types::PublicKeyBytes) -> Option<Pkid>;
    fn fetch_public_key(&self, pkid: &Pkid) -> Option<chain_types::PublicKeyBytes>;
    fn fetch_profile(&self, pkid: &Pkid) -> Option<ProfileEntry>;
    fn fetch_username_owner(&self, username_lowercase: &str) -> Option<Pkid>;
    fn fetch_balance_entry(&self, key: &BalanceKey, is_dao_coin: bool) -> Option<BalanceEntry>;
    fn fetch_post(&self, post_hash: &chain_types::Hash256) -> Option<PostEntry>;
    fn fetch_like(&self, key: &LikeKey) -> Option<LikeEntry>;
    fn fetch_follow(&self, key: &FollowKey) -> Option<FollowEntry>;
    fn fetch_repost(&self, key: &RepostKey) -> Option<RepostEntry>;
    fn fetch_diamond(&self, key: &DiamondKey) -> Option<DiamondEntry>;
    fn fetch_nft(&self, key: &NftKey) -> Option<NFTEntry>;
    fn fetch_nft_bid(&self, key: &NftBidKey) -> Option<NFTBidEntry>;
    fn fetch_message(&self, key: &MessageKey) -> Option<MessageEntry>;
    fn fetch_messaging_group(&self, key: &MessagingGroupKey) -> Option<MessagingGroupEntry>;
    fn fetch_derived_key(&self, key: &DerivedKeyMapKey) -> Option<DerivedKeyEntry>;
    fn fetch_global_params(&self) -> GlobalParamsEntry;
    fn fetch_forbidden_key(&self, key: &chain_types::PublicKeyBytes) -> bool;
    fn fetch_bitcoin_burn_seen(&self, burn_txn_id: &chain_types::Hash256) -> bool;
}

/// An always-empty backing store: every fetch misses. Used to build a fresh
/// genesis view in tests (spec §9: "tests must construct a fresh view, never
/// rely on process-global registries").
#[derive(Default, Clone, Copy)]
pub struct NullStore;

impl ChainStore for NullStore {
    fn fetch_utxo(&self, _key: &UtxoKey) -> Option<UtxoEntry> {
        None
    }
    fn fetch_balance(&self, _public_key: &chain_types::PublicKeyBytes) -> u64 {
        0
    }
    fn fetch_pkid(&self, _public_key: &chain_types::PublicKeyBytes) -> Option<Pkid> {
        None
    }
    fn fetch_public_key(&self, _pkid: &Pkid) -> Option<chain_types::PublicKeyBytes> {
        None
    }
    fn fetch_profile(&self, _pkid: &Pkid) -> Option<ProfileEntry> {
        None
    }
    fn fetch_username_owner(&self, _username_lowercase: &str) -> Option<Pkid> {
        None
    }
    fn fetch_balance_entry(&self, _key: &BalanceKey, _is_dao_coin: bool) -> Option<BalanceEntry> {
        None
    }
    fn fetch_post(&self, _post_hash: &chain_types::Hash256) -> Option<PostEntry> {
        None
    }
    fn fetch_like(&self, _key: &LikeKey) -> Option<LikeEntry> {
        None
    }
    fn fetch_follow(&self, _key: &FollowKey) -> Option<FollowEntry> {
        None
    }
    fn fetch_repost(&self, _key: &RepostKey) -> Option<RepostEntry> {
        None
    }
    fn fetch_diamond(&self, _key: &DiamondKey) -> Option<DiamondEntry> {
        None
    }
    fn fetch_nft(&self, _key: &NftKey) -> Option<NFTEntry> {
        None
    }
    fn fetch_nft_bid(&self, _key: &NftBidKey) -> Option<NFTBidEntry> {
        None
    }
    fn fetch_message(&self, _key: &MessageKey) -> Option<MessageEntry> {
        None
    }
    fn fetch_messaging_group(&self, _key: &MessagingGroupKey) -> Option<MessagingGroupEntry> {
        None
    }
    fn fetch_derived_key(&self, _key: &DerivedKeyMapKey) -> Option<DerivedKeyEntry> {
        None
    }
    fn fetch_global_params(&self) -> GlobalParamsEntry {
        GlobalParamsEntry::default()
    }
    fn fetch_forbidden_key(&self, _key: &chain_types::PublicKeyBytes) -> bool {
        false
    }
    fn fetch_bitcoin_burn_seen(&self, _burn_txn_id: &chain_types::Hash256) -> bool {
        false
    }
}
