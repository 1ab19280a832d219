//! The universal prologue/epilogue every non-block-reward transaction runs
//! (spec §4.2): spend inputs, add outputs, verify the signature, then apply
//! the diamond side-effect if the transaction carries one.

use std::collections::BTreeMap;

use chain_types::{checked_add_capped, PublicKeyBytes};

use crate::constants::{block_reward_maturity_confirmations, DIAMOND_LEVELS, MAX_NATIVE_TOKEN_SUPPLY_BASE_UNITS, MIN_DIAMOND_ACTIVATION_HEIGHT};
use crate::entries::{DiamondEntry, DiamondKey, UtxoEntry, UtxoKey, UtxoOrigin};
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

pub struct BasicTransferOutcome {
    pub undo: Vec<UndoOperation>,
    pub total_input_base_units: u64,
    pub total_output_base_units: u64,
}

fn diamond_level_amount(level: u8) -> Option<u64> {
    DIAMOND_LEVELS.iter().find(|(l, _)| *l == level).map(|(_, amt)| *amt)
}

impl View {
    pub(crate) fn connect_basic_transfer(
        &mut self,
        txn: &Transaction,
        height: u64,
        verify_signatures: bool,
        ignore_utxos: bool,
    ) -> Result<BasicTransferOutcome, RuleError> {
        let mut undo = Vec::new();

        if txn.is_block_reward() {
            if !txn.inputs.is_empty() {
                return Err(RuleError::BlockRewardHasInputs);
            }
            if txn.signature.is_some() {
                return Err(RuleError::BlockRewardHasSignature);
            }
        }

        // -- inputs --
        // Validate every input before spending any of them: a later input
        // failing its checks must leave the overlay untouched.
        let mut total_input: u64 = 0;
        let mut spends = Vec::with_capacity(txn.inputs.len());
        if !ignore_utxos {
            for input in &txn.inputs {
                let key = UtxoKey {
                    txn_id: input.txn_id,
                    output_index: input.output_index,
                };
                let store = std::rc::Rc::clone(&self.store);
                let entry = self
                    .utxos
                    .get(&key, || store.fetch_utxo(&key))
                    .cloned()
                    .ok_or(RuleError::InputSpendsNonexistentUtxo)?;
                if entry.spent {
                    return Err(RuleError::InputSpendsAlreadySpentUtxo);
                }
                if entry.owner != txn.public_key {
                    return Err(RuleError::InputPublicKeyMismatch);
                }
                if entry.is_block_reward() {
                    let confirmations = height.saturating_sub(entry.block_height);
                    if confirmations < block_reward_maturity_confirmations() {
                        return Err(RuleError::InputSpendsImmatureBlockReward);
                    }
                }
                if entry.amount_base_units > MAX_NATIVE_TOKEN_SUPPLY_BASE_UNITS {
                    return Err(RuleError::InputAmountOverflow);
                }
                total_input = total_input.checked_add(entry.amount_base_units).ok_or(RuleError::InputAmountOverflow)?;

                let mut spent_entry = entry.clone();
                spent_entry.spent = true;
                spends.push((key, entry, spent_entry));
            }
        }
        for (key, entry, spent_entry) in spends {
            undo.push(UndoOperation::SpentUtxo(key, entry));
            self.utxos.put(key, spent_entry);
        }

        // -- outputs --
        // Same two-pass shape: validate and key-collision-check every output
        // first, only then create any of them.
        let mut total_output: u64 = 0;
        let mut per_recipient: BTreeMap<PublicKeyBytes, u64> = BTreeMap::new();
        let mut creations = Vec::with_capacity(txn.outputs.len());
        let origin = if txn.is_block_reward() { UtxoOrigin::BlockReward } else { UtxoOrigin::Ordinary };
        for (index, output) in txn.outputs.iter().enumerate() {
            if output.amount_base_units > MAX_NATIVE_TOKEN_SUPPLY_BASE_UNITS {
                return Err(RuleError::OutputAmountInvalid);
            }
            total_output = checked_add_capped(total_output, output.amount_base_units, MAX_NATIVE_TOKEN_SUPPLY_BASE_UNITS)
                .ok_or(RuleError::OutputAmountOverflow)?;
            let subtotal = per_recipient.entry(output.owner).or_insert(0);
            *subtotal = subtotal.checked_add(output.amount_base_units).ok_or(RuleError::OutputAmountOverflow)?;

            let key = UtxoKey {
                txn_id: txn.txn_id,
                output_index: index as u32,
            };
            if self.utxos.peek(&key).is_some() {
                return Err(RuleError::TxnMalformed);
            }
            creations.push((
                key,
                UtxoEntry {
                    owner: output.owner,
                    amount_base_units: output.amount_base_units,
                    block_height: height,
                    origin,
                    spent: false,
                },
            ));
        }
        for (key, created_entry) in creations {
            self.utxos.put(key, created_entry);
            undo.push(UndoOperation::CreatedUtxo(key));
        }

        if !txn.is_block_reward() && total_input < total_output {
            return Err(RuleError::TotalInputLessThanTotalOutput);
        }

        // -- signature --
        if !txn.is_block_reward() && verify_signatures {
            self.verify_transaction_signature(txn, height)?;
        } else if txn.is_block_reward() && txn.derived_public_key.is_some() {
            return Err(RuleError::BlockRewardHasSignature);
        }

        // -- diamond side-effect --
        if height >= MIN_DIAMOND_ACTIVATION_HEIGHT {
            if let (Some(post_hash), Some(level)) = (txn.diamond_post_hash, txn.diamond_level) {
                let diamond_undo = self.connect_diamond(txn.public_key, post_hash, level, &per_recipient)?;
                undo.extend(diamond_undo);
            }
        }

        Ok(BasicTransferOutcome {
            undo,
            total_input_base_units: total_input,
            total_output_base_units: total_output,
        })
    }

    fn verify_transaction_signature(&mut self, txn: &Transaction, height: u64) -> Result<(), RuleError> {
        let signature = txn.signature.as_ref().ok_or(RuleError::SignatureMissing)?;
        let digest = chain_crypto::transaction_digest(txn.txn_id.as_bytes());

        let signing_key = match txn.derived_public_key {
            Some(derived) => {
                let map_key = crate::entries::DerivedKeyMapKey {
                    owner: txn.public_key,
                    derived,
                };
                let store = std::rc::Rc::clone(&self.store);
                let entry = self
                    .derived_keys
                    .get(&map_key, || store.fetch_derived_key(&map_key))
                    .cloned()
                    .ok_or(RuleError::DerivedKeyNotAuthorized)?;
                if matches!(entry.state, crate::entries::DerivedKeyAuthorizationState::Revoked) {
                    return Err(RuleError::DerivedKeyRevoked);
                }
                if !entry.is_usable_at(height) {
                    return Err(RuleError::DerivedKeyExpired);
                }
                derived
            }
            None => txn.public_key,
        };

        let ok = chain_crypto::verify(signature, &digest, &signing_key).map_err(|_| RuleError::SignatureInvalid)?;
        if !ok {
            return Err(RuleError::SignatureInvalid);
        }
        Ok(())
    }

    fn connect_diamond(
        &mut self,
        sender: PublicKeyBytes,
        diamond_post_hash: chain_types::Hash256,
        level: u8,
        per_recipient: &BTreeMap<PublicKeyBytes, u64>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let amount_required_total = diamond_level_amount(level).ok_or(RuleError::DiamondLevelInvalid)?;

        let store = std::rc::Rc::clone(&self.store);
        let post = self
            .posts
            .get(&diamond_post_hash, || store.fetch_post(&diamond_post_hash))
            .cloned()
            .ok_or(RuleError::DiamondPostNotFound)?;

        let sender_pkid = self.resolve_or_create_pkid(&sender, &mut undo);
        let receiver_pkid = post.author;
        if sender_pkid == receiver_pkid {
            return Err(RuleError::DiamondSelfTip);
        }

        let diamond_key = crate::entries::DiamondKey {
            sender: sender_pkid,
            receiver: receiver_pkid,
            diamond_post_hash,
        };
        let prior_diamond = self
            .diamonds
            .get(&diamond_key, || store.fetch_diamond(&diamond_key))
            .cloned();
        let previous_level = prior_diamond.as_ref().map(|d| d.diamond_level).unwrap_or(0);
        if level <= previous_level {
            return Err(RuleError::DiamondLevelNotIncreasing);
        }

        let already_paid: u64 = (1..=previous_level).filter_map(diamond_level_amount).sum();
        let amount_due = amount_required_total.saturating_sub(already_paid);
        let receiver_pub_key = self.current_public_key(&receiver_pkid).unwrap_or(PublicKeyBytes::EMPTY);
        let received = *per_recipient.get(&receiver_pub_key).unwrap_or(&0);
        if received < amount_due {
            return Err(RuleError::DiamondPaymentInsufficient);
        }

        undo.push(UndoOperation::PostChanged(diamond_post_hash, Some(post.clone())));
        let mut updated_post = post;
        updated_post.diamond_count += (level - previous_level) as u64;
        self.posts.put(diamond_post_hash, updated_post);

        undo.push(UndoOperation::DiamondChanged(diamond_key, prior_diamond));
        self.diamonds.put(
            diamond_key,
            DiamondEntry {
                sender: sender_pkid,
                receiver: receiver_pkid,
                diamond_post_hash,
                diamond_level: level,
            },
        );

        Ok(undo)
    }
}
