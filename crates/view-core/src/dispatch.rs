//! `ConnectTransaction` / `DisconnectTransaction` (spec §4.1): the sanity
//! check, `BasicTransfer`, and the exhaustive dispatch over `TxnBody` that
//! routes to each sub-ledger handler, in the order spec §9's "Dispatch over
//! transaction kinds" names: basic transfer first, kind-specific effects
//! appended last.

use chain_types::{fee_meets_floor, PublicKeyBytes};

use crate::constants::MAX_TXN_SIZE_BYTES;
use crate::errors::{CorruptionError, RuleError};
use crate::txn::{Transaction, TxnBody};
use crate::undo::TxnUndo;
use crate::view::View;

#[derive(Debug)]
pub struct TxnConnectOutcome {
    pub undo: TxnUndo,
    pub total_input_base_units: u64,
    pub total_output_base_units: u64,
    pub fees_base_units: u64,
}

impl View {
    #[allow(clippy::too_many_arguments)]
    pub fn connect_transaction(
        &mut self,
        txn: &Transaction,
        size_bytes: u64,
        height: u64,
        verify_signatures: bool,
        ignore_utxos: bool,
        admin_key: &PublicKeyBytes,
    ) -> Result<TxnConnectOutcome, RuleError> {
        if size_bytes > MAX_TXN_SIZE_BYTES {
            return Err(RuleError::TxnTooLarge);
        }
        if !txn.is_block_reward() && txn.inputs.is_empty() && txn.outputs.is_empty() {
            return Err(RuleError::TxnMalformed);
        }

        let outcome = self.connect_basic_transfer(txn, height, verify_signatures, ignore_utxos)?;
        let mut undo = outcome.undo;

        let fees = if txn.is_block_reward() {
            0
        } else {
            let fees = outcome.total_input_base_units.saturating_sub(outcome.total_output_base_units);
            let min_fee_per_kb = self.global_params().min_network_fee_per_kb_base_units;
            if !fee_meets_floor(fees, size_bytes, min_fee_per_kb) {
                return Err(RuleError::FeeBelowMinimum);
            }
            fees
        };

        let kind_undo = match &txn.body {
            TxnBody::BlockReward | TxnBody::BasicTransferOnly => Vec::new(),

            TxnBody::BitcoinExchange {
                burn_txn_id,
                native_tokens_to_mint_base_units,
            } => self.connect_bitcoin_exchange(txn, *burn_txn_id, *native_tokens_to_mint_base_units)?,
            TxnBody::UpdateBitcoinUsdExchangeRate { usd_cents_per_native_unit } => {
                self.connect_update_bitcoin_usd_exchange_rate(txn, admin_key, *usd_cents_per_native_unit)?
            }
            TxnBody::UpdateGlobalParams { fields, forbid_key } => self.connect_update_global_params(txn, admin_key, fields, *forbid_key)?,

            TxnBody::PrivateMessage {
                recipient,
                ciphertext,
                timestamp_nanos,
                version,
                sender_messaging_public_key,
                recipient_messaging_public_key,
                sender_messaging_group_key_name,
                recipient_messaging_group_key_name,
            } => self.connect_private_message(
                txn,
                *recipient,
                ciphertext,
                *timestamp_nanos,
                *version,
                *sender_messaging_public_key,
                *recipient_messaging_public_key,
                sender_messaging_group_key_name.clone(),
                recipient_messaging_group_key_name.clone(),
            )?,
            TxnBody::MessagingGroup {
                group_key_name,
                group_messaging_public_key,
                new_members,
            } => self.connect_messaging_group(txn, group_key_name, *group_messaging_public_key, new_members)?,

            TxnBody::SubmitPost {
                post_hash,
                parent_post_hash,
                reposted_post_hash,
                content,
                timestamp_nanos,
                hidden,
                pinned,
                extra_data,
            } => self.connect_submit_post(
                txn,
                *post_hash,
                *parent_post_hash,
                *reposted_post_hash,
                content,
                *timestamp_nanos,
                *hidden,
                *pinned,
                extra_data,
            )?,
            TxnBody::UpdateProfile {
                username,
                description,
                profile_image,
                hidden,
            } => self.connect_update_profile(txn, username, description, profile_image, *hidden)?,

            TxnBody::Follow { followed, is_unfollow } => self.connect_follow(txn, *followed, *is_unfollow)?,
            TxnBody::Like { liked_post, is_unlike } => self.connect_like(txn, *liked_post, *is_unlike)?,
            TxnBody::Repost {
                reposted_post,
                repost_post_hash,
                is_quote_repost,
                is_undo,
            } => self.connect_repost(txn, *reposted_post, *repost_post_hash, *is_quote_repost, *is_undo)?,

            TxnBody::CreatorCoin {
                creator,
                operation,
                native_tokens_base_units,
                coins_to_sell,
                min_coins_expected,
                min_native_tokens_expected_base_units,
                founder_basis_points,
            } => self.connect_creator_coin(
                txn,
                *creator,
                *operation,
                *native_tokens_base_units,
                *coins_to_sell,
                *min_coins_expected,
                *min_native_tokens_expected_base_units,
                *founder_basis_points,
            )?,
            TxnBody::CreatorCoinTransfer { creator, recipient, amount } => self.connect_creator_coin_transfer(txn, *creator, *recipient, *amount)?,

            TxnBody::DaoCoin {
                operation,
                amount,
                transfer_restriction,
            } => self.connect_dao_coin(txn, *operation, *amount, *transfer_restriction)?,
            TxnBody::DaoCoinTransfer { creator, recipient, amount } => self.connect_dao_coin_transfer(txn, *creator, *recipient, *amount)?,

            TxnBody::SwapIdentity { from, to } => {
                self.admin_key_required(txn, admin_key)?;
                self.connect_swap_identity(*from, *to)?
            }

            TxnBody::CreateNft {
                post_hash,
                num_copies,
                has_unlockable,
                is_for_sale,
                min_bid_amount_base_units,
                creator_royalty_basis_points,
                coin_royalty_basis_points,
                additional_creator_royalties_basis_points,
                additional_coin_royalties_basis_points,
            } => self.connect_create_nft(
                txn,
                *post_hash,
                *num_copies,
                *has_unlockable,
                *is_for_sale,
                *min_bid_amount_base_units,
                *creator_royalty_basis_points,
                *coin_royalty_basis_points,
                additional_creator_royalties_basis_points,
                additional_coin_royalties_basis_points,
            )?,
            TxnBody::UpdateNft {
                post_hash,
                serial_number,
                is_for_sale,
                min_bid_amount_base_units,
                is_buy_now,
                buy_now_price_base_units,
            } => self.connect_update_nft(
                txn,
                *post_hash,
                *serial_number,
                *is_for_sale,
                *min_bid_amount_base_units,
                *is_buy_now,
                *buy_now_price_base_units,
            )?,
            TxnBody::NftBid {
                post_hash,
                serial_number,
                bid_amount_base_units,
            } => self.connect_nft_bid(txn, *post_hash, *serial_number, *bid_amount_base_units)?,
            TxnBody::AcceptNftBid {
                post_hash,
                serial_number,
                bidder,
                unlockable_ciphertext,
            } => self.connect_accept_nft_bid(txn, *post_hash, *serial_number, *bidder, unlockable_ciphertext.clone())?,
            TxnBody::NftTransfer {
                post_hash,
                serial_number,
                receiver,
                unlockable_ciphertext,
            } => self.connect_nft_transfer(txn, *post_hash, *serial_number, *receiver, unlockable_ciphertext.clone())?,
            TxnBody::AcceptNftTransfer { post_hash, serial_number } => self.connect_accept_nft_transfer(txn, *post_hash, *serial_number)?,
            TxnBody::BurnNft { post_hash, serial_number } => self.connect_burn_nft(txn, *post_hash, *serial_number)?,

            TxnBody::AuthorizeDerivedKey {
                derived_public_key,
                expiration_block,
                state,
            } => self.connect_authorize_derived_key(txn, *derived_public_key, *expiration_block, *state)?,
        };
        undo.extend(kind_undo);

        tracing::debug!(txn_hash = ?txn.txn_id, height, fees, "connected transaction");

        Ok(TxnConnectOutcome {
            undo,
            total_input_base_units: outcome.total_input_base_units,
            total_output_base_units: outcome.total_output_base_units,
            fees_base_units: fees,
        })
    }

    /// The exact inverse of `connect_transaction`: replays `undo` back-to-
    /// front. A `CorruptionError` here means the overlay no longer matches
    /// what this transaction is recorded to have produced and is fatal
    /// (spec §7 class 3) — callers must halt rather than continue.
    pub fn disconnect_transaction(&mut self, txn: &Transaction, undo: TxnUndo) -> Result<(), CorruptionError> {
        self.apply_undo_operations(undo)?;
        tracing::debug!(txn_hash = ?txn.txn_id, "disconnected transaction");
        Ok(())
    }
}
