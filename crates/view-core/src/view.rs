//! The View: the single mutable aggregate spec §2 describes, composed of one
//! overlay per sub-ledger plus the chain tip. There is deliberately no
//! submodule that owns "the" state independently — every handler file adds
//! `impl View { pub(crate) fn connect_whatever(...) }` blocks, the same way
//! `marketplace-onsocial`'s handlers are all `impl Contract` blocks spread
//! across files that `use crate::*`.

use std::rc::Rc;

use chain_types::{Hash256, Pkid, PublicKeyBytes};

use crate::entries::*;
use crate::store::{ChainStore, NullStore, Overlay, Slot};

pub struct View {
    pub(crate) store: Rc<dyn ChainStore>,
    pub tip: Hash256,
    pub tip_height: u64,

    pub(crate) utxos: Overlay<UtxoKey, UtxoEntry>,
    pub(crate) balances: Overlay<PublicKeyBytes, u64>,

    pub(crate) pkid_forward: Overlay<PublicKeyBytes, Pkid>,
    pub(crate) pkid_reverse: Overlay<Pkid, PublicKeyBytes>,

    pub(crate) profiles: Overlay<Pkid, ProfileEntry>,
    pub(crate) username_owners: Overlay<String, Pkid>,
    pub(crate) creator_coin_balances: Overlay<BalanceKey, BalanceEntry>,
    pub(crate) dao_coin_balances: Overlay<BalanceKey, BalanceEntry>,

    pub(crate) posts: Overlay<Hash256, PostEntry>,
    pub(crate) likes: Overlay<LikeKey, LikeEntry>,
    pub(crate) follows: Overlay<FollowKey, FollowEntry>,
    pub(crate) reposts: Overlay<RepostKey, RepostEntry>,
    pub(crate) diamonds: Overlay<DiamondKey, DiamondEntry>,

    pub(crate) nfts: Overlay<NftKey, NFTEntry>,
    pub(crate) nft_bids: Overlay<NftBidKey, NFTBidEntry>,

    pub(crate) messages: Overlay<MessageKey, MessageEntry>,
    pub(crate) messaging_groups: Overlay<MessagingGroupKey, MessagingGroupEntry>,

    pub(crate) derived_keys: Overlay<DerivedKeyMapKey, DerivedKeyEntry>,

    pub(crate) global_params_override: Option<GlobalParamsEntry>,
    pub(crate) forbidden_keys: Overlay<PublicKeyBytes, ()>,
    pub(crate) bitcoin_burns_seen: Overlay<Hash256, ()>,
}

impl View {
    pub fn new(store: Rc<dyn ChainStore>) -> Self {
        View {
            store,
            tip: Hash256::ZERO,
            tip_height: 0,
            utxos: Overlay::new(),
            balances: Overlay::new(),
            pkid_forward: Overlay::new(),
            pkid_reverse: Overlay::new(),
            profiles: Overlay::new(),
            username_owners: Overlay::new(),
            creator_coin_balances: Overlay::new(),
            dao_coin_balances: Overlay::new(),
            posts: Overlay::new(),
            likes: Overlay::new(),
            follows: Overlay::new(),
            reposts: Overlay::new(),
            diamonds: Overlay::new(),
            nfts: Overlay::new(),
            nft_bids: Overlay::new(),
            messages: Overlay::new(),
            messaging_groups: Overlay::new(),
            derived_keys: Overlay::new(),
            global_params_override: None,
            forbidden_keys: Overlay::new(),
            bitcoin_burns_seen: Overlay::new(),
        }
    }

    /// Fresh genesis view with no backing store at all — the common case in
    /// tests (spec §9: "tests must construct a fresh view, never rely on
    /// process-global registries").
    pub fn genesis() -> Self {
        View::new(Rc::new(NullStore))
    }

    /// Pre-size the overlay maps most likely to be touched heavily within a
    /// single block (spec §5 "pre-size hash maps per block where feasible").
    pub fn with_capacity_hint(store: Rc<dyn ChainStore>, expected_entries_per_ledger: usize) -> Self {
        let mut view = View::new(store);
        view.utxos = Overlay::with_capacity(expected_entries_per_ledger);
        view.posts = Overlay::with_capacity(expected_entries_per_ledger);
        view.nfts = Overlay::with_capacity(expected_entries_per_ledger);
        view.balances = Overlay::with_capacity(expected_entries_per_ledger);
        view
    }

    /// Deep copy: every overlay is cloned so parent and child can diverge
    /// independently afterward (spec §5 "Sharing"). The backing store is
    /// shared by reference since it is read-only from the view's
    /// perspective.
    pub fn fork(&self) -> View {
        View {
            store: Rc::clone(&self.store),
            tip: self.tip,
            tip_height: self.tip_height,
            utxos: self.utxos.clone(),
            balances: self.balances.clone(),
            pkid_forward: self.pkid_forward.clone(),
            pkid_reverse: self.pkid_reverse.clone(),
            profiles: self.profiles.clone(),
            username_owners: self.username_owners.clone(),
            creator_coin_balances: self.creator_coin_balances.clone(),
            dao_coin_balances: self.dao_coin_balances.clone(),
            posts: self.posts.clone(),
            likes: self.likes.clone(),
            follows: self.follows.clone(),
            reposts: self.reposts.clone(),
            diamonds: self.diamonds.clone(),
            nfts: self.nfts.clone(),
            nft_bids: self.nft_bids.clone(),
            messages: self.messages.clone(),
            messaging_groups: self.messaging_groups.clone(),
            derived_keys: self.derived_keys.clone(),
            global_params_override: self.global_params_override,
            forbidden_keys: self.forbidden_keys.clone(),
            bitcoin_burns_seen: self.bitcoin_burns_seen.clone(),
        }
    }

    pub fn global_params(&mut self) -> GlobalParamsEntry {
        if let Some(p) = self.global_params_override {
            return p;
        }
        let fetched = self.store.fetch_global_params();
        self.global_params_override = Some(fetched);
        fetched
    }

    pub fn is_forbidden_key(&mut self, key: &PublicKeyBytes) -> bool {
        let store = Rc::clone(&self.store);
        self.forbidden_keys.get(key, || {
            if store.fetch_forbidden_key(key) {
                Some(())
            } else {
                None
            }
        });
        self.forbidden_keys.peek(key).is_some()
    }

    // -- query accessors --
    //
    // A host needs to observe committed view state without reaching into
    // private overlay fields (spec §6 describes the backing-store fetch
    // surface but not a read API for the view itself, so this mirrors that
    // shape one level up). Each one resolves overlay-then-store, the same as
    // every handler's own reads.

    pub fn utxo(&mut self, key: &UtxoKey) -> Option<UtxoEntry> {
        let store = Rc::clone(&self.store);
        self.utxos.get(key, || store.fetch_utxo(key)).cloned()
    }

    /// Unspent outputs currently owned by `owner`, drawn from the overlay
    /// only (no backing-store scan, the same limitation a mempool's own
    /// coin-selection view would have over just its own touched set).
    pub fn utxos_owned_by(&self, owner: &PublicKeyBytes) -> Vec<UtxoEntry> {
        self.utxos
            .touched()
            .filter_map(|(_, slot)| match slot {
                Slot::Live(entry) if entry.owner == *owner && !entry.spent => Some(entry.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn pkid_of(&mut self, public_key: &PublicKeyBytes) -> Pkid {
        let mut discarded = Vec::new();
        self.resolve_or_create_pkid(public_key, &mut discarded)
    }

    pub fn public_key_of(&mut self, pkid: &Pkid) -> Option<PublicKeyBytes> {
        self.current_public_key(pkid)
    }

    pub fn post(&mut self, post_hash: &Hash256) -> Option<PostEntry> {
        let store = Rc::clone(&self.store);
        self.posts.get(post_hash, || store.fetch_post(post_hash)).cloned()
    }

    pub fn profile(&mut self, pkid: &Pkid) -> Option<ProfileEntry> {
        let store = Rc::clone(&self.store);
        self.profiles.get(pkid, || store.fetch_profile(pkid)).cloned()
    }

    pub fn nft(&mut self, key: &NftKey) -> Option<NFTEntry> {
        let store = Rc::clone(&self.store);
        self.nfts.get(key, || store.fetch_nft(key)).cloned()
    }

    pub fn nft_bid(&mut self, key: &NftBidKey) -> Option<NFTBidEntry> {
        let store = Rc::clone(&self.store);
        self.nft_bids.get(key, || store.fetch_nft_bid(key)).cloned()
    }

    pub fn derived_key(&mut self, key: &DerivedKeyMapKey) -> Option<DerivedKeyEntry> {
        let store = Rc::clone(&self.store);
        self.derived_keys.get(key, || store.fetch_derived_key(key)).cloned()
    }

    pub fn creator_coin_balance(&mut self, key: &BalanceKey) -> Option<BalanceEntry> {
        let store = Rc::clone(&self.store);
        self.creator_coin_balances.get(key, || store.fetch_balance_entry(key, false)).cloned()
    }
}
