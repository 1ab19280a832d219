//! `DAOCoin` and `DAOCoinTransfer` (spec §4.3): mint/burn/disable-mint issued
//! by the profile owner, and transfers gated by the profile's DAO transfer
//! restriction, where `PermanentlyUnrestricted` is a one-way latch.

use chain_types::{CoinAmount, Pkid};

use crate::entries::{BalanceEntry, BalanceKey, TransferRestrictionStatus};
use crate::errors::RuleError;
use crate::txn::{DaoCoinOperation, Transaction};
use crate::undo::UndoOperation;
use crate::view::View;

impl View {
    pub(crate) fn connect_dao_coin(
        &mut self,
        txn: &Transaction,
        operation: DaoCoinOperation,
        amount: CoinAmount,
        transfer_restriction: Option<TransferRestrictionStatus>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let owner = self.resolve_or_create_pkid(&txn.public_key, &mut undo);
        let mut profile = self.require_profile(&owner)?;
        let prior_coin_entry = profile.dao_coin.clone();

        match operation {
            DaoCoinOperation::Mint => {
                if profile.dao_coin.minting_disabled {
                    return Err(RuleError::DaoCoinMintingDisabled);
                }
                if amount.is_zero() {
                    return Err(RuleError::OutputAmountInvalid);
                }
                let owner_key = BalanceKey { holder: owner, creator: owner };
                let store = std::rc::Rc::clone(&self.store);
                let prior_balance = self
                    .dao_coin_balances
                    .get(&owner_key, || store.fetch_balance_entry(&owner_key, true))
                    .cloned()
                    .unwrap_or_else(BalanceEntry::zero);
                let new_balance = prior_balance.balance.checked_add(&amount).ok_or(RuleError::OutputAmountOverflow)?;
                let new_circulation = profile.dao_coin.coins_in_circulation.checked_add(&amount).ok_or(RuleError::OutputAmountOverflow)?;

                undo.push(UndoOperation::BalanceEntryChanged(owner_key, true, Some(prior_balance)));
                let became_holder = prior_balance.balance.is_zero();
                self.dao_coin_balances.put(
                    owner_key,
                    BalanceEntry {
                        balance: new_balance,
                        has_purchased: true,
                    },
                );
                profile.dao_coin.coins_in_circulation = new_circulation;
                if new_circulation > profile.dao_coin.circulation_watermark {
                    profile.dao_coin.circulation_watermark = new_circulation;
                }
                if became_holder {
                    profile.dao_coin.num_holders += 1;
                }
            }
            DaoCoinOperation::Burn => {
                if amount.is_zero() {
                    return Err(RuleError::OutputAmountInvalid);
                }
                let owner_key = BalanceKey { holder: owner, creator: owner };
                let store = std::rc::Rc::clone(&self.store);
                let prior_balance = self
                    .dao_coin_balances
                    .get(&owner_key, || store.fetch_balance_entry(&owner_key, true))
                    .cloned()
                    .unwrap_or_else(BalanceEntry::zero);
                let new_balance = prior_balance.balance.checked_sub(&amount).ok_or(RuleError::DaoCoinInsufficientBalance)?;
                let new_circulation = profile.dao_coin.coins_in_circulation.checked_sub(&amount).ok_or(RuleError::DaoCoinInsufficientBalance)?;

                undo.push(UndoOperation::BalanceEntryChanged(owner_key, true, Some(prior_balance)));
                self.dao_coin_balances.put(
                    owner_key,
                    BalanceEntry {
                        balance: new_balance,
                        has_purchased: prior_balance.has_purchased,
                    },
                );
                profile.dao_coin.coins_in_circulation = new_circulation;
                if new_balance.is_zero() && !prior_balance.balance.is_zero() {
                    profile.dao_coin.num_holders = profile.dao_coin.num_holders.saturating_sub(1);
                }
            }
            DaoCoinOperation::DisableMinting => {
                profile.dao_coin.minting_disabled = true;
            }
        }

        if let Some(status) = transfer_restriction {
            if profile.dao_coin.transfer_restriction.is_terminal() {
                return Err(RuleError::CreatorCoinTransferRestricted);
            }
            profile.dao_coin.transfer_restriction = status;
        }

        undo.push(UndoOperation::ProfileChanged(owner, Some({
            let mut prior_profile = profile.clone();
            prior_profile.dao_coin = prior_coin_entry;
            prior_profile
        })));
        self.profiles.put(owner, profile);

        Ok(undo)
    }

    pub(crate) fn connect_dao_coin_transfer(
        &mut self,
        txn: &Transaction,
        creator: Pkid,
        recipient: Pkid,
        amount: CoinAmount,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let sender = self.resolve_or_create_pkid(&txn.public_key, &mut undo);
        if amount.is_zero() {
            return Err(RuleError::OutputAmountInvalid);
        }

        let mut profile = self.require_profile(&creator)?;
        match profile.dao_coin.transfer_restriction {
            TransferRestrictionStatus::OwnerOnly if sender != creator && recipient != creator => {
                return Err(RuleError::DaoCoinInsufficientBalance);
            }
            TransferRestrictionStatus::HoldersOnly => {
                let store = std::rc::Rc::clone(&self.store);
                let recipient_key = BalanceKey { holder: recipient, creator };
                let already_holds = self
                    .dao_coin_balances
                    .get(&recipient_key, || store.fetch_balance_entry(&recipient_key, true))
                    .map(|b| !b.balance.is_zero())
                    .unwrap_or(false);
                if !already_holds {
                    return Err(RuleError::DaoCoinInsufficientBalance);
                }
            }
            _ => {}
        }

        let store = std::rc::Rc::clone(&self.store);
        let sender_key = BalanceKey { holder: sender, creator };
        let sender_balance = self
            .dao_coin_balances
            .get(&sender_key, || store.fetch_balance_entry(&sender_key, true))
            .cloned()
            .unwrap_or_else(BalanceEntry::zero);
        let new_sender_balance = sender_balance.balance.checked_sub(&amount).ok_or(RuleError::DaoCoinInsufficientBalance)?;

        let recipient_key = BalanceKey { holder: recipient, creator };
        let recipient_balance = self
            .dao_coin_balances
            .get(&recipient_key, || store.fetch_balance_entry(&recipient_key, true))
            .cloned()
            .unwrap_or_else(BalanceEntry::zero);
        let new_recipient_balance = recipient_balance.balance.checked_add(&amount).ok_or(RuleError::OutputAmountOverflow)?;

        undo.push(UndoOperation::ProfileChanged(creator, Some(profile.clone())));
        if new_sender_balance.is_zero() && !sender_balance.balance.is_zero() {
            profile.dao_coin.num_holders = profile.dao_coin.num_holders.saturating_sub(1);
        }
        if recipient_balance.balance.is_zero() && !new_recipient_balance.is_zero() {
            profile.dao_coin.num_holders += 1;
        }

        undo.push(UndoOperation::BalanceEntryChanged(sender_key, true, Some(sender_balance)));
        self.dao_coin_balances.put(
            sender_key,
            BalanceEntry {
                balance: new_sender_balance,
                has_purchased: sender_balance.has_purchased,
            },
        );
        undo.push(UndoOperation::BalanceEntryChanged(recipient_key, true, Some(recipient_balance)));
        self.dao_coin_balances.put(
            recipient_key,
            BalanceEntry {
                balance: new_recipient_balance,
                has_purchased: true,
            },
        );
        self.profiles.put(creator, profile);

        Ok(undo)
    }
}
