//! `BitcoinExchange`, `UpdateBitcoinUSDExchangeRate`, `UpdateGlobalParams`
//! (spec §4.3). All three are admin-keyed except `BitcoinExchange`, which is
//! permissionless but gated by a verified cross-chain burn identifier the
//! view tracks to prevent double-mint.

use std::collections::BTreeMap;

use chain_types::{Hash256, PublicKeyBytes};

use crate::entries::{GlobalParamsEntry, UtxoEntry, UtxoKey, UtxoOrigin};
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

impl View {
    pub(crate) fn connect_bitcoin_exchange(
        &mut self,
        txn: &Transaction,
        burn_txn_id: Hash256,
        native_tokens_to_mint_base_units: u64,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let store = std::rc::Rc::clone(&self.store);
        let already_seen = self
            .bitcoin_burns_seen
            .get(&burn_txn_id, || if store.fetch_bitcoin_burn_seen(&burn_txn_id) { Some(()) } else { None })
            .is_some();
        if already_seen {
            return Err(RuleError::DoubleMintBurnTxn);
        }

        let mut undo = Vec::new();
        undo.push(UndoOperation::BitcoinBurnSeenInserted(burn_txn_id));
        self.bitcoin_burns_seen.put(burn_txn_id, ());

        let output_index = u32::MAX - self.utxos.len_touched() as u32;
        let key = UtxoKey {
            txn_id: txn.txn_id,
            output_index,
        };
        undo.push(UndoOperation::CreatedUtxo(key));
        self.utxos.put(
            key,
            UtxoEntry {
                owner: txn.public_key,
                amount_base_units: native_tokens_to_mint_base_units,
                block_height: 0,
                origin: UtxoOrigin::CrossChainBurn,
                spent: false,
            },
        );

        Ok(undo)
    }

    pub(crate) fn connect_update_bitcoin_usd_exchange_rate(&mut self, txn: &Transaction, admin_key: &PublicKeyBytes, usd_cents_per_native_unit: u64) -> Result<Vec<UndoOperation>, RuleError> {
        self.admin_key_required(txn, admin_key)?;
        let before = self.global_params();
        let undo = vec![UndoOperation::GlobalParamsChanged(before)];
        let mut updated = before;
        updated.usd_cents_per_native_unit = usd_cents_per_native_unit;
        self.global_params_override = Some(updated);
        Ok(undo)
    }

    pub(crate) fn connect_update_global_params(
        &mut self,
        txn: &Transaction,
        admin_key: &PublicKeyBytes,
        fields: &BTreeMap<String, u64>,
        forbid_key: Option<PublicKeyBytes>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        self.admin_key_required(txn, admin_key)?;
        let before = self.global_params();
        let mut updated = before;

        for (name, value) in fields {
            match name.as_str() {
                "usd_cents_per_native_unit" => updated.usd_cents_per_native_unit = *value,
                "profile_creation_fee_base_units" => updated.profile_creation_fee_base_units = *value,
                "nft_creation_fee_base_units" => updated.nft_creation_fee_base_units = *value,
                "max_nft_copies" => {
                    if *value == 0 {
                        return Err(RuleError::GlobalParamOutOfBounds);
                    }
                    updated.max_nft_copies = *value;
                }
                "min_network_fee_per_kb_base_units" => updated.min_network_fee_per_kb_base_units = *value,
                _ => return Err(RuleError::GlobalParamOutOfBounds),
            }
        }

        if let Some(key) = forbid_key {
            if self.is_forbidden_key(&key) {
                return Err(RuleError::GlobalParamOutOfBounds);
            }
        }

        let mut undo = vec![UndoOperation::GlobalParamsChanged(before)];
        self.global_params_override = Some(updated);

        if let Some(key) = forbid_key {
            undo.push(UndoOperation::ForbiddenKeyInserted(key));
            self.forbidden_keys.put(key, ());
        }

        Ok(undo)
    }
}
