//! `CreateNFT`, `UpdateNFT`, `NFTBid`, `AcceptNFTBid`, `NFTTransfer`,
//! `AcceptNFTTransfer`, `BurnNFT` (spec §4.3, NFT lifecycle state machine).

use std::collections::BTreeMap;

use chain_types::{Hash256, Pkid};

use crate::constants::BASIS_POINTS_DENOMINATOR;
use crate::entries::{NFTBidEntry, NFTEntry, NftBidKey, NftKey, UtxoEntry, UtxoKey, UtxoOrigin};
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::{RoyaltyPayoutKind, UndoOperation};
use crate::view::View;

impl View {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn connect_create_nft(
        &mut self,
        txn: &Transaction,
        post_hash: Hash256,
        num_copies: u64,
        has_unlockable: bool,
        is_for_sale: bool,
        min_bid_amount_base_units: u64,
        creator_royalty_basis_points: u32,
        coin_royalty_basis_points: u32,
        additional_creator_royalties_basis_points: &BTreeMap<Pkid, u32>,
        additional_coin_royalties_basis_points: &BTreeMap<Pkid, u32>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let author = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let store = std::rc::Rc::clone(&self.store);
        let mut post = self.posts.get(&post_hash, || store.fetch_post(&post_hash)).cloned().ok_or(RuleError::PostNotFound)?;
        if post.author != author {
            return Err(RuleError::PostAuthorMismatch);
        }
        if post.nft.is_nft {
            return Err(RuleError::PostAlreadyNft);
        }

        let max_copies = self.global_params().max_nft_copies;
        if num_copies == 0 || num_copies > max_copies {
            return Err(RuleError::NftMaxCopiesExceeded);
        }

        let additional_sum: u32 = additional_creator_royalties_basis_points.values().sum::<u32>() + additional_coin_royalties_basis_points.values().sum::<u32>();
        let total_bp = (creator_royalty_basis_points as u64) + (coin_royalty_basis_points as u64) + (additional_sum as u64);
        if total_bp > BASIS_POINTS_DENOMINATOR as u64 {
            return Err(RuleError::RoyaltySumExceedsBound);
        }
        if additional_creator_royalties_basis_points.contains_key(&author) || additional_coin_royalties_basis_points.contains_key(&author) {
            return Err(RuleError::RoyaltyAuthorInAdditionalMap);
        }

        let creation_fee = self.global_params().nft_creation_fee_base_units.saturating_mul(num_copies);
        if creation_fee > 0 {
            let paid: u64 = txn.outputs.iter().map(|o| o.amount_base_units).sum();
            if paid < creation_fee {
                return Err(RuleError::NftCreationFeeNotPaid);
            }
        }

        undo.push(UndoOperation::PostChanged(post_hash, Some(post.clone())));
        post.nft.is_nft = true;
        post.nft.num_copies = num_copies;
        post.nft.num_copies_for_sale = if is_for_sale { num_copies } else { 0 };
        post.nft.has_unlockable = has_unlockable;
        post.nft.creator_royalty_basis_points = creator_royalty_basis_points;
        post.nft.coin_royalty_basis_points = coin_royalty_basis_points;
        post.nft.additional_creator_royalties_basis_points = additional_creator_royalties_basis_points.clone();
        post.nft.additional_coin_royalties_basis_points = additional_coin_royalties_basis_points.clone();
        self.posts.put(post_hash, post);

        for serial_number in 1..=num_copies {
            let key = NftKey { post_hash, serial_number };
            undo.push(UndoOperation::NftChanged(key, None));
            self.nfts.put(
                key,
                NFTEntry {
                    post_hash,
                    serial_number,
                    owner: author,
                    last_owner: author,
                    is_for_sale,
                    min_bid_amount_base_units,
                    last_accepted_bid_amount_base_units: 0,
                    is_pending: false,
                    is_buy_now: false,
                    buy_now_price_base_units: 0,
                    unlockable_ciphertext: Vec::new(),
                    accepted_bid_history: Vec::new(),
                    burned: false,
                },
            );
        }

        Ok(undo)
    }

    pub(crate) fn connect_update_nft(
        &mut self,
        txn: &Transaction,
        post_hash: Hash256,
        serial_number: u64,
        is_for_sale: bool,
        min_bid_amount_base_units: u64,
        is_buy_now: bool,
        buy_now_price_base_units: u64,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let owner_pkid = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let key = NftKey { post_hash, serial_number };
        let store = std::rc::Rc::clone(&self.store);
        let mut entry = self.nfts.get(&key, || store.fetch_nft(&key)).cloned().ok_or(RuleError::NftNotFound)?;
        if entry.owner != owner_pkid {
            return Err(RuleError::NftNotOwner);
        }
        if entry.burned {
            return Err(RuleError::NftSerialAlreadyBurned);
        }
        if entry.is_pending {
            return Err(RuleError::NftPendingTransfer);
        }
        if is_buy_now && is_for_sale {
            let post = self.posts.get(&post_hash, || store.fetch_post(&post_hash)).cloned().ok_or(RuleError::PostNotFound)?;
            if post.nft.has_unlockable {
                return Err(RuleError::NftBuyNowWithUnlockable);
            }
        }

        undo.push(UndoOperation::NftChanged(key, Some(entry.clone())));

        if entry.is_for_sale && !is_for_sale {
            for (bid_key, bid) in self.collect_open_bids(post_hash, serial_number) {
                undo.push(UndoOperation::NftBidChanged(bid_key, Some(bid)));
                self.nft_bids.delete(bid_key);
            }
        }

        entry.is_for_sale = is_for_sale;
        entry.min_bid_amount_base_units = min_bid_amount_base_units;
        entry.is_buy_now = is_buy_now;
        entry.buy_now_price_base_units = buy_now_price_base_units;
        self.nfts.put(key, entry);

        Ok(undo)
    }

    fn collect_open_bids(&mut self, post_hash: Hash256, serial_number: u64) -> Vec<(NftBidKey, NFTBidEntry)> {
        self.nft_bids
            .touched()
            .filter_map(|(key, slot)| match slot {
                crate::store::Slot::Live(bid) if key.post_hash == post_hash && key.serial_number == serial_number => Some((*key, bid.clone())),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn connect_nft_bid(&mut self, txn: &Transaction, post_hash: Hash256, serial_number: u64, bid_amount_base_units: u64) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let bidder = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let nft_key = NftKey { post_hash, serial_number };
        let store = std::rc::Rc::clone(&self.store);
        let entry = self.nfts.get(&nft_key, || store.fetch_nft(&nft_key)).cloned().ok_or(RuleError::NftNotFound)?;
        if entry.burned {
            return Err(RuleError::NftSerialAlreadyBurned);
        }
        if !entry.is_for_sale && bid_amount_base_units > 0 {
            return Err(RuleError::NftNotForSale);
        }
        if bid_amount_base_units > 0 && bid_amount_base_units < entry.min_bid_amount_base_units {
            return Err(RuleError::NftBidTooLow);
        }

        let bid_key = NftBidKey { bidder, post_hash, serial_number };
        let prior_bid = self.nft_bids.get(&bid_key, || store.fetch_nft_bid(&bid_key)).cloned();

        if bid_amount_base_units == 0 {
            if prior_bid.is_some() {
                undo.push(UndoOperation::NftBidChanged(bid_key, prior_bid));
                self.nft_bids.delete(bid_key);
            }
            return Ok(undo);
        }

        undo.push(UndoOperation::NftBidChanged(bid_key, prior_bid));
        self.nft_bids.put(
            bid_key,
            NFTBidEntry {
                bidder,
                post_hash,
                serial_number,
                bid_amount_base_units,
            },
        );

        if entry.is_buy_now && bid_amount_base_units >= entry.buy_now_price_base_units && entry.buy_now_price_base_units > 0 {
            // Buy-now auto-accept runs as the nft's current owner, not the bidder
            // who happens to be signing this NftBid transaction.
            let accept_undo = self.execute_accept_nft_bid(txn.txn_id, post_hash, serial_number, entry.owner, bidder, Vec::new())?;
            undo.extend(accept_undo);
        }

        Ok(undo)
    }

    pub(crate) fn connect_accept_nft_bid(
        &mut self,
        txn: &Transaction,
        post_hash: Hash256,
        serial_number: u64,
        bidder: Pkid,
        unlockable_ciphertext: Vec<u8>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let seller = self.resolve_or_create_pkid(&txn.public_key, &mut undo);
        undo.extend(self.execute_accept_nft_bid(txn.txn_id, post_hash, serial_number, seller, bidder, unlockable_ciphertext)?);
        Ok(undo)
    }

    /// Shared by the owner-signed `AcceptNftBid` path and the buy-now
    /// auto-accept triggered from inside `connect_nft_bid`, where the
    /// signing transaction belongs to the bidder rather than the seller.
    fn execute_accept_nft_bid(
        &mut self,
        payout_txn_id: Hash256,
        post_hash: Hash256,
        serial_number: u64,
        seller: Pkid,
        bidder: Pkid,
        unlockable_ciphertext: Vec<u8>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();

        let nft_key = NftKey { post_hash, serial_number };
        let store = std::rc::Rc::clone(&self.store);
        let mut nft = self.nfts.get(&nft_key, || store.fetch_nft(&nft_key)).cloned().ok_or(RuleError::NftNotFound)?;
        if nft.owner != seller {
            return Err(RuleError::NftNotOwner);
        }
        if nft.burned {
            return Err(RuleError::NftSerialAlreadyBurned);
        }

        let bid_key = NftBidKey { bidder, post_hash, serial_number };
        let bid = self.nft_bids.get(&bid_key, || store.fetch_nft_bid(&bid_key)).cloned().ok_or(RuleError::NftBidNotFound)?;
        let bid_amount = bid.bid_amount_base_units;

        let post = self.posts.get(&post_hash, || store.fetch_post(&post_hash)).cloned().ok_or(RuleError::PostNotFound)?;
        let author = post.author;

        let mut remaining = bid_amount;
        let mut payout_ops = Vec::new();

        let creator_direct = bid_amount.saturating_mul(post.nft.creator_royalty_basis_points as u64) / BASIS_POINTS_DENOMINATOR as u64;
        if creator_direct > 0 {
            remaining = remaining.saturating_sub(creator_direct);
            payout_ops.push((author, creator_direct, RoyaltyPayoutKind::CreatorDirect));
        }

        let coin_royalty = bid_amount.saturating_mul(post.nft.coin_royalty_basis_points as u64) / BASIS_POINTS_DENOMINATOR as u64;
        if coin_royalty > 0 {
            remaining = remaining.saturating_sub(coin_royalty);
            if let Some(mut author_profile) = self.profiles.get(&author, || store.fetch_profile(&author)).cloned() {
                if let Some(new_reserve) = author_profile.creator_coin.native_token_reserve_base_units.checked_add(coin_royalty) {
                    undo.push(UndoOperation::ProfileChanged(author, Some(author_profile.clone())));
                    author_profile.creator_coin.native_token_reserve_base_units = new_reserve;
                    self.profiles.put(author, author_profile);
                    undo.push(UndoOperation::RoyaltyPayoutRecorded {
                        recipient: author,
                        amount_base_units: coin_royalty,
                        kind: RoyaltyPayoutKind::CreatorCoin,
                    });
                }
            }
        }

        for (pkid, bp) in &post.nft.additional_creator_royalties_basis_points {
            let share = bid_amount.saturating_mul(*bp as u64) / BASIS_POINTS_DENOMINATOR as u64;
            if share > 0 {
                remaining = remaining.saturating_sub(share);
                payout_ops.push((*pkid, share, RoyaltyPayoutKind::AdditionalCreator));
            }
        }
        for (pkid, bp) in &post.nft.additional_coin_royalties_basis_points {
            let share = bid_amount.saturating_mul(*bp as u64) / BASIS_POINTS_DENOMINATOR as u64;
            if share > 0 {
                remaining = remaining.saturating_sub(share);
                payout_ops.push((*pkid, share, RoyaltyPayoutKind::AdditionalCoin));
            }
        }

        for (recipient_pkid, amount, kind) in payout_ops {
            let origin = match kind {
                RoyaltyPayoutKind::CreatorDirect => UtxoOrigin::NftCreatorRoyalty,
                RoyaltyPayoutKind::AdditionalCreator | RoyaltyPayoutKind::AdditionalCoin => UtxoOrigin::NftAdditionalRoyalty,
                RoyaltyPayoutKind::Seller => UtxoOrigin::NftSellerProceeds,
                RoyaltyPayoutKind::CreatorCoin => UtxoOrigin::NftCreatorRoyalty,
            };
            if let Some(owner_key) = self.current_public_key(&recipient_pkid) {
                let output_index = u32::MAX - self.utxos.len_touched() as u32;
                let utxo_key = UtxoKey { txn_id: payout_txn_id, output_index };
                undo.push(UndoOperation::CreatedUtxo(utxo_key));
                self.utxos.put(
                    utxo_key,
                    UtxoEntry {
                        owner: owner_key,
                        amount_base_units: amount,
                        block_height: 0,
                        origin,
                        spent: false,
                    },
                );
            }
            undo.push(UndoOperation::RoyaltyPayoutRecorded {
                recipient: recipient_pkid,
                amount_base_units: amount,
                kind,
            });
        }

        if remaining > 0 {
            if let Some(seller_key) = self.current_public_key(&seller) {
                let output_index = u32::MAX - self.utxos.len_touched() as u32;
                let utxo_key = UtxoKey { txn_id: payout_txn_id, output_index };
                undo.push(UndoOperation::CreatedUtxo(utxo_key));
                self.utxos.put(
                    utxo_key,
                    UtxoEntry {
                        owner: seller_key,
                        amount_base_units: remaining,
                        block_height: 0,
                        origin: UtxoOrigin::NftSellerProceeds,
                        spent: false,
                    },
                );
            }
            undo.push(UndoOperation::RoyaltyPayoutRecorded {
                recipient: seller,
                amount_base_units: remaining,
                kind: RoyaltyPayoutKind::Seller,
            });
        }

        undo.push(UndoOperation::NftBidChanged(bid_key, Some(bid)));
        self.nft_bids.delete(bid_key);

        undo.push(UndoOperation::NftChanged(nft_key, Some(nft.clone())));
        nft.last_owner = nft.owner;
        nft.owner = bidder;
        nft.is_for_sale = false;
        nft.is_pending = false;
        nft.last_accepted_bid_amount_base_units = bid_amount;
        nft.accepted_bid_history.push(bid_amount);
        if !unlockable_ciphertext.is_empty() {
            nft.unlockable_ciphertext = unlockable_ciphertext;
        }
        self.nfts.put(nft_key, nft);

        Ok(undo)
    }

    pub(crate) fn connect_nft_transfer(&mut self, txn: &Transaction, post_hash: Hash256, serial_number: u64, receiver: Pkid, unlockable_ciphertext: Vec<u8>) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let owner_pkid = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let key = NftKey { post_hash, serial_number };
        let store = std::rc::Rc::clone(&self.store);
        let mut entry = self.nfts.get(&key, || store.fetch_nft(&key)).cloned().ok_or(RuleError::NftNotFound)?;
        if entry.owner != owner_pkid {
            return Err(RuleError::NftNotOwner);
        }
        if entry.burned {
            return Err(RuleError::NftSerialAlreadyBurned);
        }
        if entry.is_pending {
            return Err(RuleError::NftPendingTransfer);
        }

        undo.push(UndoOperation::NftChanged(key, Some(entry.clone())));
        entry.last_owner = entry.owner;
        entry.owner = receiver;
        entry.is_pending = true;
        entry.is_for_sale = false;
        if !unlockable_ciphertext.is_empty() {
            entry.unlockable_ciphertext = unlockable_ciphertext;
        }
        self.nfts.put(key, entry);

        Ok(undo)
    }

    pub(crate) fn connect_accept_nft_transfer(&mut self, txn: &Transaction, post_hash: Hash256, serial_number: u64) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let receiver = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let key = NftKey { post_hash, serial_number };
        let store = std::rc::Rc::clone(&self.store);
        let mut entry = self.nfts.get(&key, || store.fetch_nft(&key)).cloned().ok_or(RuleError::NftNotFound)?;
        if entry.owner != receiver {
            return Err(RuleError::NftNotOwner);
        }
        if !entry.is_pending {
            return Err(RuleError::NftNotPendingTransfer);
        }

        undo.push(UndoOperation::NftChanged(key, Some(entry.clone())));
        entry.is_pending = false;
        self.nfts.put(key, entry);

        Ok(undo)
    }

    pub(crate) fn connect_burn_nft(&mut self, txn: &Transaction, post_hash: Hash256, serial_number: u64) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let owner_pkid = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let key = NftKey { post_hash, serial_number };
        let store = std::rc::Rc::clone(&self.store);
        let mut entry = self.nfts.get(&key, || store.fetch_nft(&key)).cloned().ok_or(RuleError::NftNotFound)?;
        if entry.owner != owner_pkid {
            return Err(RuleError::NftNotOwner);
        }
        if entry.burned {
            return Err(RuleError::NftSerialAlreadyBurned);
        }
        if entry.is_pending {
            return Err(RuleError::NftPendingTransfer);
        }

        let mut post = self.posts.get(&post_hash, || store.fetch_post(&post_hash)).cloned().ok_or(RuleError::PostNotFound)?;

        undo.push(UndoOperation::NftChanged(key, Some(entry.clone())));
        entry.burned = true;
        entry.is_for_sale = false;
        self.nfts.put(key, entry);

        undo.push(UndoOperation::PostChanged(post_hash, Some(post.clone())));
        if post.nft.num_copies_for_sale > 0 {
            post.nft.num_copies_for_sale -= 1;
        }
        post.nft.num_copies_burned += 1;
        self.posts.put(post_hash, post);

        Ok(undo)
    }
}
