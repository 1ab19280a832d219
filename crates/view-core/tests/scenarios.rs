//! One `#[test]` per scenario from the spec's testable-properties section,
//! plus a couple of the general invariants (reversibility, signature
//! necessity) that the scenarios alone don't pin down. Built directly
//! against `View` the way `chain-crypto`'s own tests build directly against
//! `verify`/`transaction_digest` — no mock backing store beyond `genesis()`.

use std::collections::BTreeMap;

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

use chain_types::{CoinAmount, Hash256, PublicKeyBytes};
use view_core::{
    block_reward_maturity_confirmations, DerivedKeyAuthorizationState, NftBidKey, NftKey, RuleError, SizedTransaction, Transaction, TxnBody,
    TxnInput, TxnOutput, View,
};

fn keypair() -> (SigningKey, PublicKeyBytes) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let mut bytes = [0u8; 33];
    bytes[1..].copy_from_slice(signing_key.verifying_key().as_bytes());
    (signing_key, PublicKeyBytes(bytes))
}

fn hash(seed: u8) -> Hash256 {
    Hash256([seed; 32])
}

fn sign(signing_key: &SigningKey, txn_id: Hash256) -> Vec<u8> {
    let digest = chain_crypto::transaction_digest(txn_id.as_bytes());
    signing_key.sign(digest.as_bytes()).to_bytes().to_vec()
}

fn zero_output(owner: PublicKeyBytes) -> Vec<TxnOutput> {
    vec![TxnOutput { owner, amount_base_units: 0 }]
}

#[test]
fn s1_block_reward_matures_then_spends_and_the_block_pair_disconnects_cleanly() {
    let mut view = View::genesis();
    let (_, admin) = keypair();
    let (a_signing, a_key) = keypair();
    let (_, b_key) = keypair();

    let reward_txn_id = hash(1);
    let block_reward_txn = Transaction {
        txn_id: reward_txn_id,
        public_key: PublicKeyBytes::EMPTY,
        inputs: vec![],
        outputs: vec![TxnOutput { owner: a_key, amount_base_units: 1_000_000 }],
        signature: None,
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BlockReward,
    };

    let block1_hash = hash(10);
    let outcome1 = view
        .connect_block(block1_hash, Hash256::ZERO, 1, &[SizedTransaction { txn: &block_reward_txn, size_bytes: 0 }], true, &admin)
        .expect("block reward connects");
    assert_eq!(view.tip, block1_hash);
    assert_eq!(view.tip_height, 1);

    // the reward is not yet spendable in the block it was minted in
    let premature_txn_id = hash(2);
    let premature_sig = sign(&a_signing, premature_txn_id);
    let premature_txn = Transaction {
        txn_id: premature_txn_id,
        public_key: a_key,
        inputs: vec![TxnInput { txn_id: reward_txn_id, output_index: 0 }],
        outputs: vec![TxnOutput { owner: b_key, amount_base_units: 400_000 }, TxnOutput { owner: a_key, amount_base_units: 600_000 }],
        signature: Some(premature_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BasicTransferOnly,
    };
    let premature_err = view.connect_transaction(&premature_txn, 0, 1, true, false, &admin).unwrap_err();
    assert_eq!(premature_err, RuleError::InputSpendsImmatureBlockReward);

    // a second block, past maturity, carries the transfer
    let transfer_height = 1 + block_reward_maturity_confirmations();
    let transfer_txn_id = hash(3);
    let transfer_sig = sign(&a_signing, transfer_txn_id);
    let transfer_txn = Transaction {
        txn_id: transfer_txn_id,
        public_key: a_key,
        inputs: vec![TxnInput { txn_id: reward_txn_id, output_index: 0 }],
        outputs: vec![TxnOutput { owner: b_key, amount_base_units: 400_000 }, TxnOutput { owner: a_key, amount_base_units: 600_000 }],
        signature: Some(transfer_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BasicTransferOnly,
    };

    let block2_hash = hash(11);
    let outcome2 = view
        .connect_block(block2_hash, block1_hash, transfer_height, &[SizedTransaction { txn: &transfer_txn, size_bytes: 0 }], true, &admin)
        .expect("transfer connects once the reward has matured");
    assert_eq!(view.tip, block2_hash);
    assert_eq!(view.tip_height, transfer_height);

    let b_output = view.utxo(&view_core::UtxoKey { txn_id: transfer_txn_id, output_index: 0 }).unwrap();
    assert_eq!(b_output.amount_base_units, 400_000);
    let a_change = view.utxo(&view_core::UtxoKey { txn_id: transfer_txn_id, output_index: 1 }).unwrap();
    assert_eq!(a_change.amount_base_units, 600_000);
    let spent_reward = view.utxo(&view_core::UtxoKey { txn_id: reward_txn_id, output_index: 0 }).unwrap();
    assert!(spent_reward.spent);

    // disconnecting both blocks is the exact inverse, back to genesis
    view.disconnect_block(block2_hash, block1_hash, 1, &[&transfer_txn], outcome2.per_txn_undo).unwrap();
    view.disconnect_block(block1_hash, Hash256::ZERO, 0, &[&block_reward_txn], outcome1.per_txn_undo).unwrap();

    assert_eq!(view.tip, Hash256::ZERO);
    assert_eq!(view.tip_height, 0);
    assert!(view.utxo(&view_core::UtxoKey { txn_id: reward_txn_id, output_index: 0 }).is_none());
    assert!(view.utxo(&view_core::UtxoKey { txn_id: transfer_txn_id, output_index: 0 }).is_none());
    assert!(view.utxo(&view_core::UtxoKey { txn_id: transfer_txn_id, output_index: 1 }).is_none());
}

#[test]
fn s2_creator_coin_founder_reward_taxes_only_the_watermark_excess() {
    let mut view = View::genesis();
    let (_, admin) = keypair();
    let (creator_signing, creator_key) = keypair();
    let (a_signing, a_key) = keypair();
    let (b_signing, b_key) = keypair();
    let (c_signing, c_key) = keypair();

    let reward_txn = Transaction {
        txn_id: hash(20),
        public_key: PublicKeyBytes::EMPTY,
        inputs: vec![],
        outputs: vec![
            TxnOutput { owner: a_key, amount_base_units: 10_000 },
            TxnOutput { owner: b_key, amount_base_units: 10_000 },
            TxnOutput { owner: c_key, amount_base_units: 10_000 },
        ],
        signature: None,
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BlockReward,
    };
    view.connect_block(hash(21), Hash256::ZERO, 1, &[SizedTransaction { txn: &reward_txn, size_bytes: 0 }], true, &admin).unwrap();
    let mature_height = 1 + block_reward_maturity_confirmations();

    let profile_txn_id = hash(22);
    let profile_sig = sign(&creator_signing, profile_txn_id);
    let profile_txn = Transaction {
        txn_id: profile_txn_id,
        public_key: creator_key,
        inputs: vec![],
        outputs: zero_output(creator_key),
        signature: Some(profile_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::UpdateProfile {
            username: "creator".to_string(),
            description: String::new(),
            profile_image: vec![],
            hidden: false,
        },
    };
    view.connect_transaction(&profile_txn, 0, mature_height, true, true, &admin).unwrap();
    let creator_pkid = view.pkid_of(&creator_key);

    // Trade 1: a fresh profile's founder rate defaults to zero, and the
    // bonded curve's own early-exit branch (supply and reserve both zero)
    // mints 1:1 with no floating-point rounding at all. No founder reward.
    let buy1_txn_id = hash(23);
    let buy1_sig = sign(&a_signing, buy1_txn_id);
    let buy1_txn = Transaction {
        txn_id: buy1_txn_id,
        public_key: a_key,
        inputs: vec![TxnInput { txn_id: reward_txn.txn_id, output_index: 0 }],
        outputs: vec![TxnOutput { owner: creator_key, amount_base_units: 100 }, TxnOutput { owner: a_key, amount_base_units: 9_900 }],
        signature: Some(buy1_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::CreatorCoin {
            creator: creator_pkid,
            operation: view_core::CreatorCoinOperation::Buy,
            native_tokens_base_units: 100,
            coins_to_sell: CoinAmount::ZERO,
            min_coins_expected: CoinAmount::ZERO,
            min_native_tokens_expected_base_units: 0,
            founder_basis_points: None,
        },
    };
    view.connect_transaction(&buy1_txn, 0, mature_height, true, false, &admin).unwrap();

    let founder_key = view_core::BalanceKey { holder: creator_pkid, creator: creator_pkid };
    assert!(view.creator_coin_balance(&founder_key).is_none(), "a zero founder reward leaves no balance entry at all");
    let profile1 = view.profile(&creator_pkid).unwrap();
    let c1 = profile1.creator_coin.coins_in_circulation.to_u128().unwrap();
    assert_eq!(c1, 100);
    assert_eq!(profile1.creator_coin.circulation_watermark.to_u128().unwrap(), 100);

    // Trade 2: this call passes founder_basis_points=Some(1000), but the
    // rate only takes effect for calls *after* this one — it is applied to
    // the profile once the match arm above has already run. So trade 2
    // itself still pays no founder reward, even though it is the call that
    // configures the rate going forward.
    let buy2_txn_id = hash(24);
    let buy2_sig = sign(&b_signing, buy2_txn_id);
    let buy2_txn = Transaction {
        txn_id: buy2_txn_id,
        public_key: b_key,
        inputs: vec![TxnInput { txn_id: reward_txn.txn_id, output_index: 1 }],
        outputs: vec![TxnOutput { owner: creator_key, amount_base_units: 700 }, TxnOutput { owner: b_key, amount_base_units: 9_300 }],
        signature: Some(buy2_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::CreatorCoin {
            creator: creator_pkid,
            operation: view_core::CreatorCoinOperation::Buy,
            native_tokens_base_units: 700,
            coins_to_sell: CoinAmount::ZERO,
            min_coins_expected: CoinAmount::ZERO,
            min_native_tokens_expected_base_units: 0,
            founder_basis_points: Some(1_000),
        },
    };
    view.connect_transaction(&buy2_txn, 0, mature_height, true, false, &admin).unwrap();

    assert!(view.creator_coin_balance(&founder_key).is_none(), "the rate set by trade 2 does not apply retroactively to trade 2 itself");
    let profile2 = view.profile(&creator_pkid).unwrap();
    let c2 = profile2.creator_coin.coins_in_circulation.to_u128().unwrap();
    assert_eq!(profile2.creator_coin.circulation_watermark.to_u128().unwrap(), c2, "no founder mint means the watermark tracks circulation exactly");
    assert_eq!(profile2.creator_coin.founder_basis_points, 1_000);

    // Trade 3: now the 1000bp rate configured by trade 2 is live, and since
    // trade 2 left the watermark sitting exactly at c2, trade 3's entire
    // mint is new excess — the founder cut lands on exactly what this trade
    // minted, not on any of the circulation trades 1 and 2 already built up.
    let buy3_txn_id = hash(25);
    let buy3_sig = sign(&c_signing, buy3_txn_id);
    let buy3_txn = Transaction {
        txn_id: buy3_txn_id,
        public_key: c_key,
        inputs: vec![TxnInput { txn_id: reward_txn.txn_id, output_index: 2 }],
        outputs: vec![TxnOutput { owner: creator_key, amount_base_units: 500 }, TxnOutput { owner: c_key, amount_base_units: 9_500 }],
        signature: Some(buy3_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::CreatorCoin {
            creator: creator_pkid,
            operation: view_core::CreatorCoinOperation::Buy,
            native_tokens_base_units: 500,
            coins_to_sell: CoinAmount::ZERO,
            min_coins_expected: CoinAmount::ZERO,
            min_native_tokens_expected_base_units: 0,
            founder_basis_points: None,
        },
    };
    view.connect_transaction(&buy3_txn, 0, mature_height, true, false, &admin).unwrap();

    let profile3 = view.profile(&creator_pkid).unwrap();
    let c3 = profile3.creator_coin.coins_in_circulation.to_u128().unwrap();
    let founder_balance3 = view.creator_coin_balance(&founder_key).unwrap().balance.to_u128().unwrap();
    let c_pkid = view.pkid_of(&c_key);
    let c_balance3 = view.creator_coin_balance(&view_core::BalanceKey { holder: c_pkid, creator: creator_pkid }).unwrap().balance.to_u128().unwrap();

    assert!(founder_balance3 > 0, "trade 3 must finally mint a nonzero founder reward");
    let minted3 = c3 - c2 - founder_balance3;
    assert_eq!(c_balance3, minted3, "the buyer's own balance reflects only the minted coins, not the founder cut");
    assert_eq!(founder_balance3, minted3 * 1_000 / 10_000, "founder cut is exactly basis points of this trade's own excess");
}

#[test]
fn s3_nft_bid_accept_splits_royalties_exactly_and_leaves_the_losing_bid_open() {
    let mut view = View::genesis();
    let (_, admin) = keypair();
    let (creator_signing, creator_key) = keypair();
    let (a_signing, a_key) = keypair();
    let (b_signing, b_key) = keypair();
    let (_, extra_key) = keypair();

    let profile_sig = sign(&creator_signing, hash(29));
    let profile_txn = Transaction {
        txn_id: hash(29),
        public_key: creator_key,
        inputs: vec![],
        outputs: zero_output(creator_key),
        signature: Some(profile_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::UpdateProfile {
            username: "nftcreator".to_string(),
            description: String::new(),
            profile_image: vec![],
            hidden: false,
        },
    };
    view.connect_transaction(&profile_txn, 0, 1, true, true, &admin).unwrap();

    let post_hash = hash(30);
    let submit_sig = sign(&creator_signing, hash(31));
    let submit_txn = Transaction {
        txn_id: hash(31),
        public_key: creator_key,
        inputs: vec![],
        outputs: zero_output(creator_key),
        signature: Some(submit_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::SubmitPost {
            post_hash,
            parent_post_hash: None,
            reposted_post_hash: None,
            content: b"hello".to_vec(),
            timestamp_nanos: 1,
            hidden: false,
            pinned: false,
            extra_data: BTreeMap::new(),
        },
    };
    view.connect_transaction(&submit_txn, 0, 1, true, true, &admin).unwrap();

    let extra_pkid = view.pkid_of(&extra_key);
    let mut additional_creator = BTreeMap::new();
    additional_creator.insert(extra_pkid, 1_000);

    let create_sig = sign(&creator_signing, hash(32));
    let create_txn = Transaction {
        txn_id: hash(32),
        public_key: creator_key,
        inputs: vec![],
        outputs: zero_output(creator_key),
        signature: Some(create_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::CreateNft {
            post_hash,
            num_copies: 1,
            has_unlockable: false,
            is_for_sale: true,
            min_bid_amount_base_units: 1,
            creator_royalty_basis_points: 2_500,
            coin_royalty_basis_points: 2_500,
            additional_creator_royalties_basis_points: additional_creator,
            additional_coin_royalties_basis_points: BTreeMap::new(),
        },
    };
    view.connect_transaction(&create_txn, 0, 1, true, true, &admin).unwrap();

    let bid_a_sig = sign(&a_signing, hash(33));
    let bid_a_txn = Transaction {
        txn_id: hash(33),
        public_key: a_key,
        inputs: vec![],
        outputs: zero_output(a_key),
        signature: Some(bid_a_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::NftBid { post_hash, serial_number: 1, bid_amount_base_units: 10 },
    };
    view.connect_transaction(&bid_a_txn, 0, 1, true, true, &admin).unwrap();

    let bid_b_sig = sign(&b_signing, hash(34));
    let bid_b_txn = Transaction {
        txn_id: hash(34),
        public_key: b_key,
        inputs: vec![],
        outputs: zero_output(b_key),
        signature: Some(bid_b_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::NftBid { post_hash, serial_number: 1, bid_amount_base_units: 20 },
    };
    view.connect_transaction(&bid_b_txn, 0, 1, true, true, &admin).unwrap();

    let b_pkid = view.pkid_of(&b_key);
    let accept_sig = sign(&creator_signing, hash(35));
    let accept_txn = Transaction {
        txn_id: hash(35),
        public_key: creator_key,
        inputs: vec![],
        outputs: zero_output(creator_key),
        signature: Some(accept_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::AcceptNftBid { post_hash, serial_number: 1, bidder: b_pkid, unlockable_ciphertext: vec![] },
    };
    view.connect_transaction(&accept_txn, 0, 1, true, true, &admin).unwrap();

    let nft = view.nft(&NftKey { post_hash, serial_number: 1 }).unwrap();
    assert_eq!(nft.owner, b_pkid);
    assert_eq!(nft.accepted_bid_history, vec![20]);

    let a_pkid = view.pkid_of(&a_key);
    let a_bid = view.nft_bid(&NftBidKey { bidder: a_pkid, post_hash, serial_number: 1 }).unwrap();
    assert_eq!(a_bid.bid_amount_base_units, 10, "the losing bid stays open, it is never auto-cancelled");

    // bid_amount 20: creator_direct 5 (UTXO) + coin_royalty 5 (profile reserve,
    // not a UTXO) + additional_creator 2 (UTXO) + seller remainder 8 (UTXO)
    let creator_total: u64 = view.utxos_owned_by(&creator_key).iter().map(|u| u.amount_base_units).sum();
    let extra_total: u64 = view.utxos_owned_by(&extra_key).iter().map(|u| u.amount_base_units).sum();
    assert_eq!(creator_total, 13, "creator_direct (5) + seller remainder (8), coin_royalty goes to the reserve instead");
    assert_eq!(extra_total, 2);
    let creator_pkid_for_reserve = view.pkid_of(&creator_key);
    let creator_profile = view.profile(&creator_pkid_for_reserve).unwrap();
    assert_eq!(creator_profile.creator_coin.native_token_reserve_base_units, 5, "coin_royalty is credited straight into the post author's coin reserve");
    assert_eq!(creator_total + extra_total + creator_profile.creator_coin.native_token_reserve_base_units, 20);
}

#[test]
fn s4_derived_key_authorizes_then_expires() {
    let mut view = View::genesis();
    let (_, admin) = keypair();
    let (owner_signing, owner_key) = keypair();
    let (derived_signing, derived_key) = keypair();

    let auth_sig = sign(&owner_signing, hash(40));
    let auth_txn = Transaction {
        txn_id: hash(40),
        public_key: owner_key,
        inputs: vec![],
        outputs: zero_output(owner_key),
        signature: Some(auth_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::AuthorizeDerivedKey {
            derived_public_key: derived_key,
            expiration_block: 15,
            state: DerivedKeyAuthorizationState::Valid,
        },
    };
    view.connect_transaction(&auth_txn, 0, 5, true, true, &admin).unwrap();

    let ok_sig = sign(&derived_signing, hash(41));
    let ok_txn = Transaction {
        txn_id: hash(41),
        public_key: owner_key,
        inputs: vec![],
        outputs: zero_output(owner_key),
        signature: Some(ok_sig),
        derived_public_key: Some(derived_key),
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BasicTransferOnly,
    };
    view.connect_transaction(&ok_txn, 0, 10, true, true, &admin).expect("derived key usable before expiration");

    let expired_sig = sign(&derived_signing, hash(42));
    let expired_txn = Transaction {
        txn_id: hash(42),
        public_key: owner_key,
        inputs: vec![],
        outputs: zero_output(owner_key),
        signature: Some(expired_sig),
        derived_public_key: Some(derived_key),
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BasicTransferOnly,
    };
    let err = view.connect_transaction(&expired_txn, 0, 16, true, true, &admin).unwrap_err();
    assert_eq!(err, RuleError::DerivedKeyExpired);
}

#[test]
fn s5_post_timestamp_collision_rejected_and_diamond_raises_count() {
    let mut view = View::genesis();
    let (_, admin) = keypair();
    let (a_signing, a_key) = keypair();
    let (b_signing, b_key) = keypair();

    let post_hash = hash(50);
    let post1_sig = sign(&a_signing, hash(51));
    let post1_txn = Transaction {
        txn_id: hash(51),
        public_key: a_key,
        inputs: vec![],
        outputs: zero_output(a_key),
        signature: Some(post1_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::SubmitPost {
            post_hash,
            parent_post_hash: None,
            reposted_post_hash: None,
            content: b"first".to_vec(),
            timestamp_nanos: 1_000,
            hidden: false,
            pinned: false,
            extra_data: BTreeMap::new(),
        },
    };
    view.connect_transaction(&post1_txn, 0, 1, true, true, &admin).unwrap();

    let post_hash2 = hash(52);
    let post2_sig = sign(&a_signing, hash(53));
    let post2_txn = Transaction {
        txn_id: hash(53),
        public_key: a_key,
        inputs: vec![],
        outputs: zero_output(a_key),
        signature: Some(post2_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::SubmitPost {
            post_hash: post_hash2,
            parent_post_hash: None,
            reposted_post_hash: None,
            content: b"second".to_vec(),
            timestamp_nanos: 1_000,
            hidden: false,
            pinned: false,
            extra_data: BTreeMap::new(),
        },
    };
    let err = view.connect_transaction(&post2_txn, 0, 1, true, true, &admin).unwrap_err();
    assert_eq!(err, RuleError::PostTimestampCollision);

    // 5 native units, in base units, comfortably covers diamond level 2's cost
    let reward_txn = Transaction {
        txn_id: hash(54),
        public_key: PublicKeyBytes::EMPTY,
        inputs: vec![],
        outputs: vec![TxnOutput { owner: b_key, amount_base_units: 5_000_000_000 }],
        signature: None,
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BlockReward,
    };
    view.connect_block(hash(55), Hash256::ZERO, 1, &[SizedTransaction { txn: &reward_txn, size_bytes: 0 }], true, &admin).unwrap();
    let mature_height = 1 + block_reward_maturity_confirmations();

    let diamond_sig = sign(&b_signing, hash(56));
    let diamond_txn = Transaction {
        txn_id: hash(56),
        public_key: b_key,
        inputs: vec![TxnInput { txn_id: reward_txn.txn_id, output_index: 0 }],
        outputs: vec![TxnOutput { owner: a_key, amount_base_units: 5_000_000_000 }],
        signature: Some(diamond_sig),
        derived_public_key: None,
        diamond_post_hash: Some(post_hash),
        diamond_level: Some(2),
        body: TxnBody::BasicTransferOnly,
    };
    view.connect_transaction(&diamond_txn, 0, mature_height, true, false, &admin).unwrap();

    let post = view.post(&post_hash).unwrap();
    assert_eq!(post.diamond_count, 2);
}

#[test]
fn s6_swap_identity_preserves_nft_ownership_under_the_newly_bound_key() {
    let mut view = View::genesis();
    let (admin_signing, admin_key) = keypair();
    let (k1_signing, k1) = keypair();
    let (k2_signing, k2) = keypair();
    let (_, k3) = keypair();

    let post_hash = hash(60);
    let submit_sig = sign(&k1_signing, hash(61));
    let submit_txn = Transaction {
        txn_id: hash(61),
        public_key: k1,
        inputs: vec![],
        outputs: zero_output(k1),
        signature: Some(submit_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::SubmitPost {
            post_hash,
            parent_post_hash: None,
            reposted_post_hash: None,
            content: b"mine".to_vec(),
            timestamp_nanos: 1,
            hidden: false,
            pinned: false,
            extra_data: BTreeMap::new(),
        },
    };
    view.connect_transaction(&submit_txn, 0, 1, true, true, &admin_key).unwrap();

    let create_sig = sign(&k1_signing, hash(62));
    let create_txn = Transaction {
        txn_id: hash(62),
        public_key: k1,
        inputs: vec![],
        outputs: zero_output(k1),
        signature: Some(create_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::CreateNft {
            post_hash,
            num_copies: 1,
            has_unlockable: false,
            is_for_sale: false,
            min_bid_amount_base_units: 1,
            creator_royalty_basis_points: 0,
            coin_royalty_basis_points: 0,
            additional_creator_royalties_basis_points: BTreeMap::new(),
            additional_coin_royalties_basis_points: BTreeMap::new(),
        },
    };
    view.connect_transaction(&create_txn, 0, 1, true, true, &admin_key).unwrap();
    let pkid1 = view.pkid_of(&k1);

    // k2 must have touched the view once before it can be a swap target
    let touch_sig = sign(&k2_signing, hash(63));
    let touch_txn = Transaction {
        txn_id: hash(63),
        public_key: k2,
        inputs: vec![],
        outputs: zero_output(k2),
        signature: Some(touch_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BasicTransferOnly,
    };
    view.connect_transaction(&touch_txn, 0, 1, true, true, &admin_key).unwrap();
    let pkid2 = view.pkid_of(&k2);

    let swap_sig = sign(&admin_signing, hash(64));
    let swap_txn = Transaction {
        txn_id: hash(64),
        public_key: admin_key,
        inputs: vec![],
        outputs: zero_output(admin_key),
        signature: Some(swap_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::SwapIdentity { from: pkid1, to: pkid2 },
    };
    view.connect_transaction(&swap_txn, 0, 1, true, true, &admin_key).unwrap();

    // the nft is still recorded as owned by pkid1, but k2 now signs for it
    let nft_before = view.nft(&NftKey { post_hash, serial_number: 1 }).unwrap();
    assert_eq!(nft_before.owner, pkid1);

    let pkid3 = view.pkid_of(&k3);
    let transfer_sig = sign(&k2_signing, hash(65));
    let transfer_txn = Transaction {
        txn_id: hash(65),
        public_key: k2,
        inputs: vec![],
        outputs: zero_output(k2),
        signature: Some(transfer_sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::NftTransfer { post_hash, serial_number: 1, receiver: pkid3, unlockable_ciphertext: vec![] },
    };
    view.connect_transaction(&transfer_txn, 0, 1, true, true, &admin_key).expect("k2 now signs as pkid1");

    let nft_after = view.nft(&NftKey { post_hash, serial_number: 1 }).unwrap();
    assert_eq!(nft_after.owner, pkid3);
    assert_eq!(nft_after.last_owner, pkid1);
    assert!(nft_after.is_pending);
}

#[test]
fn signature_missing_is_rejected() {
    let mut view = View::genesis();
    let (_, admin) = keypair();
    let (_, key) = keypair();
    let txn = Transaction {
        txn_id: hash(70),
        public_key: key,
        inputs: vec![],
        outputs: zero_output(key),
        signature: None,
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::BasicTransferOnly,
    };
    let err = view.connect_transaction(&txn, 0, 1, true, true, &admin).unwrap_err();
    assert_eq!(err, RuleError::SignatureMissing);
}

#[test]
fn disconnect_transaction_is_the_exact_inverse_of_connect() {
    let mut view = View::genesis();
    let (_, admin) = keypair();
    let (signing, key) = keypair();
    let pkid = view.pkid_of(&key);

    let txn_id = hash(80);
    let sig = sign(&signing, txn_id);
    let txn = Transaction {
        txn_id,
        public_key: key,
        inputs: vec![],
        outputs: zero_output(key),
        signature: Some(sig),
        derived_public_key: None,
        diamond_post_hash: None,
        diamond_level: None,
        body: TxnBody::UpdateProfile {
            username: "alice".to_string(),
            description: "hi".to_string(),
            profile_image: vec![],
            hidden: false,
        },
    };

    let outcome = view.connect_transaction(&txn, 0, 1, true, true, &admin).unwrap();
    assert!(view.profile(&pkid).is_some());

    view.disconnect_transaction(&txn, outcome.undo).unwrap();
    assert!(view.profile(&pkid).is_none());
}
