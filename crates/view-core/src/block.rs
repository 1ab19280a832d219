//! Block-level `ConnectBlock` / `DisconnectBlock` (spec §4.1).

use chain_types::{Hash256, PublicKeyBytes};

use crate::constants::{base_reward, MAX_BLOCK_SIZE_BYTES};
use crate::dispatch::TxnConnectOutcome;
use crate::errors::{CorruptionError, RuleError};
use crate::txn::Transaction;
use crate::undo::TxnUndo;
use crate::view::View;

pub struct SizedTransaction<'a> {
    pub txn: &'a Transaction,
    pub size_bytes: u64,
}

pub struct BlockConnectOutcome {
    pub per_txn_undo: Vec<TxnUndo>,
    pub total_fees_base_units: u64,
}

impl View {
    /// Requires `block_parent_hash` equal the view's tip; processes
    /// transactions in order; enforces the block-reward cap; advances the
    /// tip to `block_hash` on success.
    pub fn connect_block(
        &mut self,
        block_hash: Hash256,
        block_parent_hash: Hash256,
        height: u64,
        txns: &[SizedTransaction<'_>],
        verify_signatures: bool,
        admin_key: &PublicKeyBytes,
    ) -> Result<BlockConnectOutcome, RuleError> {
        if block_parent_hash != self.tip {
            return Err(RuleError::BlockParentMismatch);
        }
        if txns.iter().map(|t| t.size_bytes).sum::<u64>() > MAX_BLOCK_SIZE_BYTES {
            return Err(RuleError::TxnTooLarge);
        }

        let mut per_txn_undo = Vec::with_capacity(txns.len());
        let mut total_fees: u64 = 0;
        let mut block_reward_outputs: u64 = 0;

        for sized in txns {
            let outcome: TxnConnectOutcome = self.connect_transaction(sized.txn, sized.size_bytes, height, verify_signatures, false, admin_key)?;
            if sized.txn.is_block_reward() {
                block_reward_outputs = block_reward_outputs.checked_add(outcome.total_output_base_units).ok_or(RuleError::OutputAmountOverflow)?;
            } else {
                total_fees = total_fees.checked_add(outcome.fees_base_units).ok_or(RuleError::OutputAmountOverflow)?;
            }
            per_txn_undo.push(outcome.undo);
        }

        let allowed_reward = base_reward(height).checked_add(total_fees).ok_or(RuleError::OutputAmountOverflow)?;
        if block_reward_outputs > allowed_reward {
            return Err(RuleError::BlockRewardExceedsAllowed);
        }

        self.tip = block_hash;
        self.tip_height = height;

        tracing::debug!(?block_hash, height, total_fees, txn_count = txns.len(), "connected block");

        Ok(BlockConnectOutcome {
            per_txn_undo,
            total_fees_base_units: total_fees,
        })
    }

    /// Requires `block_hash` equal the view's tip; processes transactions in
    /// reverse; rewinds the tip to `block_parent_hash`.
    pub fn disconnect_block(
        &mut self,
        block_hash: Hash256,
        block_parent_hash: Hash256,
        parent_height: u64,
        txns: &[&Transaction],
        per_txn_undo: Vec<TxnUndo>,
    ) -> Result<(), CorruptionError> {
        if block_hash != self.tip {
            return Err(CorruptionError::UndoEntryMismatch("block hash does not match view tip"));
        }
        if txns.len() != per_txn_undo.len() {
            return Err(CorruptionError::UndoLogExhausted);
        }

        for (txn, undo) in txns.iter().rev().zip(per_txn_undo.into_iter().rev()) {
            self.disconnect_transaction(txn, undo)?;
        }

        self.tip = block_parent_hash;
        self.tip_height = parent_height;

        tracing::debug!(?block_hash, "disconnected block");
        Ok(())
    }
}
