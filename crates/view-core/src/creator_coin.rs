//! `CreatorCoin` and `CreatorCoinTransfer` (spec §4.3): a Bancor-style bonded
//! curve with a founder reward minted whenever a trade pushes circulation
//! past its watermark.
//!
//! The buy/sell exponent is evaluated in `f64`; the spec leaves exact
//! rounding below the precision of the chosen math library undetermined
//! (spec §9 Open Questions), so this core rounds every minted/paid amount
//! down (never mint or pay out more than the curve implies).

use chain_types::{CoinAmount, Pkid};

use crate::constants::{BASIS_POINTS_DENOMINATOR, CREATOR_COIN_RESERVE_RATIO, MAX_NATIVE_TOKEN_SUPPLY_BASE_UNITS};
use crate::entries::{BalanceEntry, BalanceKey, TransferRestrictionStatus, UtxoEntry, UtxoKey, UtxoOrigin};
use crate::errors::RuleError;
use crate::txn::{CreatorCoinOperation, Transaction};
use crate::undo::UndoOperation;
use crate::view::View;

fn bancor_buy(supply: f64, reserve: f64, delta_reserve: f64) -> f64 {
    if reserve <= 0.0 || supply <= 0.0 {
        return delta_reserve;
    }
    supply * ((1.0 + delta_reserve / reserve).powf(CREATOR_COIN_RESERVE_RATIO) - 1.0)
}

fn bancor_sell(supply: f64, reserve: f64, delta_coins: f64) -> f64 {
    if supply <= 0.0 || delta_coins >= supply {
        return reserve;
    }
    reserve * (1.0 - (1.0 - delta_coins / supply).powf(1.0 / CREATOR_COIN_RESERVE_RATIO))
}

fn apply_basis_points(amount: CoinAmount, basis_points: u32) -> CoinAmount {
    match amount.to_u128() {
        Some(units) => {
            let scaled = units.saturating_mul(basis_points as u128) / BASIS_POINTS_DENOMINATOR as u128;
            CoinAmount::from_u128(scaled)
        }
        None => {
            let scaled = amount.to_f64_lossy() * basis_points as f64 / BASIS_POINTS_DENOMINATOR as f64;
            CoinAmount::from_u128(scaled.floor() as u128)
        }
    }
}

impl View {
    pub(crate) fn connect_creator_coin(
        &mut self,
        txn: &Transaction,
        creator: Pkid,
        operation: CreatorCoinOperation,
        native_tokens_base_units: u64,
        coins_to_sell: CoinAmount,
        min_coins_expected: CoinAmount,
        min_native_tokens_expected_base_units: u64,
        founder_basis_points: Option<u32>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let buyer_or_seller = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let mut profile = self.require_profile(&creator)?;
        if let Some(bp) = founder_basis_points {
            if bp > BASIS_POINTS_DENOMINATOR {
                return Err(RuleError::CreatorCoinFounderBpInvalid);
            }
        }
        let balance_key = BalanceKey { holder: buyer_or_seller, creator };
        let store = std::rc::Rc::clone(&self.store);
        let prior_balance = self
            .creator_coin_balances
            .get(&balance_key, || store.fetch_balance_entry(&balance_key, false))
            .cloned()
            .unwrap_or_else(BalanceEntry::zero);

        let prior_coin_entry = profile.creator_coin.clone();

        match operation {
            CreatorCoinOperation::Buy => {
                if native_tokens_base_units == 0 {
                    return Err(RuleError::OutputAmountInvalid);
                }
                let paid = txn
                    .outputs
                    .iter()
                    .filter(|o| o.owner == profile.public_key)
                    .map(|o| o.amount_base_units)
                    .fold(0u64, |a, b| a.saturating_add(b));
                if paid < native_tokens_base_units {
                    return Err(RuleError::TotalInputLessThanTotalOutput);
                }

                let supply = profile.creator_coin.coins_in_circulation.to_f64_lossy();
                let reserve = profile.creator_coin.native_token_reserve_base_units as f64;
                let minted = bancor_buy(supply, reserve, native_tokens_base_units as f64).max(0.0);
                let minted_coins = CoinAmount::from_u128(minted.floor() as u128);
                if minted_coins < min_coins_expected {
                    return Err(RuleError::OutputAmountInvalid);
                }

                let new_reserve = profile
                    .creator_coin
                    .native_token_reserve_base_units
                    .checked_add(native_tokens_base_units)
                    .ok_or(RuleError::InputAmountOverflow)?;
                if new_reserve > MAX_NATIVE_TOKEN_SUPPLY_BASE_UNITS {
                    return Err(RuleError::InputAmountOverflow);
                }

                let new_circulation_before_founder = profile
                    .creator_coin
                    .coins_in_circulation
                    .checked_add(&minted_coins)
                    .ok_or(RuleError::OutputAmountOverflow)?;

                let watermark = profile.creator_coin.circulation_watermark;
                let excess = new_circulation_before_founder.saturating_sub(&watermark);
                let founder_reward = if excess.is_zero() {
                    CoinAmount::ZERO
                } else {
                    apply_basis_points(excess, profile.creator_coin.founder_basis_points)
                };

                let new_circulation = new_circulation_before_founder
                    .checked_add(&founder_reward)
                    .ok_or(RuleError::OutputAmountOverflow)?;
                let new_watermark = if new_circulation > watermark { new_circulation } else { watermark };

                let was_zero_balance = prior_balance.balance.is_zero();
                let new_buyer_balance = BalanceEntry {
                    balance: prior_balance.balance.checked_add(&minted_coins).ok_or(RuleError::OutputAmountOverflow)?,
                    has_purchased: true,
                };

                let founder_payout = if founder_reward > CoinAmount::ZERO {
                    let founder_key = BalanceKey { holder: creator, creator };
                    let prior_founder = self
                        .creator_coin_balances
                        .get(&founder_key, || store.fetch_balance_entry(&founder_key, false))
                        .cloned()
                        .unwrap_or_else(BalanceEntry::zero);
                    let new_founder_balance = BalanceEntry {
                        balance: prior_founder.balance.checked_add(&founder_reward).ok_or(RuleError::OutputAmountOverflow)?,
                        has_purchased: prior_founder.has_purchased,
                    };
                    Some((founder_key, prior_founder, new_founder_balance))
                } else {
                    None
                };

                undo.push(UndoOperation::BalanceEntryChanged(balance_key, false, Some(prior_balance)));
                self.creator_coin_balances.put(balance_key, new_buyer_balance);

                if let Some((founder_key, prior_founder, new_founder_balance)) = founder_payout {
                    undo.push(UndoOperation::BalanceEntryChanged(founder_key, false, Some(prior_founder)));
                    self.creator_coin_balances.put(founder_key, new_founder_balance);
                }

                profile.creator_coin.native_token_reserve_base_units = new_reserve;
                profile.creator_coin.coins_in_circulation = new_circulation;
                profile.creator_coin.circulation_watermark = new_watermark;
                if was_zero_balance {
                    profile.creator_coin.num_holders += 1;
                }
            }
            CreatorCoinOperation::Sell => {
                if coins_to_sell.is_zero() || coins_to_sell > prior_balance.balance {
                    return Err(RuleError::CreatorCoinInsufficientBalance);
                }
                let supply = profile.creator_coin.coins_in_circulation.to_f64_lossy();
                let reserve = profile.creator_coin.native_token_reserve_base_units as f64;
                let paid_out = bancor_sell(supply, reserve, coins_to_sell.to_f64_lossy()).max(0.0);
                let paid_out_units = paid_out.floor() as u64;
                if paid_out_units < min_native_tokens_expected_base_units {
                    return Err(RuleError::OutputAmountInvalid);
                }
                let new_reserve = profile
                    .creator_coin
                    .native_token_reserve_base_units
                    .checked_sub(paid_out_units)
                    .ok_or(RuleError::CreatorCoinReserveNegative)?;
                let new_circulation = profile
                    .creator_coin
                    .coins_in_circulation
                    .checked_sub(&coins_to_sell)
                    .ok_or(RuleError::CreatorCoinInsufficientBalance)?;

                let new_balance = prior_balance.balance.checked_sub(&coins_to_sell).ok_or(RuleError::CreatorCoinInsufficientBalance)?;
                let becomes_zero = new_balance.is_zero();

                undo.push(UndoOperation::BalanceEntryChanged(balance_key, false, Some(prior_balance.clone())));
                self.creator_coin_balances.put(
                    balance_key,
                    BalanceEntry {
                        balance: new_balance,
                        has_purchased: prior_balance.has_purchased,
                    },
                );

                let payout_key = UtxoKey {
                    txn_id: txn.txn_id,
                    output_index: u32::MAX - self.utxos.len_touched() as u32,
                };
                undo.push(UndoOperation::CreatedUtxo(payout_key));
                self.utxos.put(
                    payout_key,
                    UtxoEntry {
                        owner: txn.public_key,
                        amount_base_units: paid_out_units,
                        block_height: 0,
                        origin: UtxoOrigin::CreatorCoinSale,
                        spent: false,
                    },
                );

                profile.creator_coin.native_token_reserve_base_units = new_reserve;
                if new_circulation.is_zero() {
                    profile.creator_coin.coins_in_circulation = CoinAmount::ZERO;
                    profile.creator_coin.circulation_watermark = CoinAmount::ZERO;
                    profile.creator_coin.native_token_reserve_base_units = 0;
                } else {
                    profile.creator_coin.coins_in_circulation = new_circulation;
                }
                if becomes_zero {
                    profile.creator_coin.num_holders = profile.creator_coin.num_holders.saturating_sub(1);
                }
            }
            CreatorCoinOperation::AddNativeTokens => {
                let new_reserve = profile
                    .creator_coin
                    .native_token_reserve_base_units
                    .checked_add(native_tokens_base_units)
                    .ok_or(RuleError::InputAmountOverflow)?;
                profile.creator_coin.native_token_reserve_base_units = new_reserve;
            }
        }

        if let Some(bp) = founder_basis_points {
            profile.creator_coin.founder_basis_points = bp;
        }

        undo.push(UndoOperation::ProfileChanged(creator, Some({
            let mut prior_profile = profile.clone();
            prior_profile.creator_coin = prior_coin_entry;
            prior_profile
        })));
        self.profiles.put(creator, profile);

        Ok(undo)
    }

    pub(crate) fn connect_creator_coin_transfer(
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

        let profile = self.require_profile(&creator)?;
        if profile.creator_coin.transfer_restriction == TransferRestrictionStatus::OwnerOnly && sender != creator && recipient != creator {
            return Err(RuleError::CreatorCoinTransferRestricted);
        }
        if profile.creator_coin.transfer_restriction == TransferRestrictionStatus::HoldersOnly {
            let store = std::rc::Rc::clone(&self.store);
            let recipient_key = BalanceKey { holder: recipient, creator };
            let recipient_already_holds = self
                .creator_coin_balances
                .get(&recipient_key, || store.fetch_balance_entry(&recipient_key, false))
                .map(|b| !b.balance.is_zero())
                .unwrap_or(false);
            if !recipient_already_holds {
                return Err(RuleError::CreatorCoinTransferRestricted);
            }
        }

        let sender_key = BalanceKey { holder: sender, creator };
        let store = std::rc::Rc::clone(&self.store);
        let sender_balance = self
            .creator_coin_balances
            .get(&sender_key, || store.fetch_balance_entry(&sender_key, false))
            .cloned()
            .unwrap_or_else(BalanceEntry::zero);
        let new_sender_balance = sender_balance.balance.checked_sub(&amount).ok_or(RuleError::CreatorCoinInsufficientBalance)?;

        let recipient_key = BalanceKey { holder: recipient, creator };
        let recipient_balance = self
            .creator_coin_balances
            .get(&recipient_key, || store.fetch_balance_entry(&recipient_key, false))
            .cloned()
            .unwrap_or_else(BalanceEntry::zero);
        let new_recipient_balance = recipient_balance.balance.checked_add(&amount).ok_or(RuleError::OutputAmountOverflow)?;

        let mut profile = profile;
        undo.push(UndoOperation::ProfileChanged(creator, Some(profile.clone())));
        if new_sender_balance.is_zero() && !sender_balance.balance.is_zero() {
            profile.creator_coin.num_holders = profile.creator_coin.num_holders.saturating_sub(1);
        }
        if recipient_balance.balance.is_zero() && !new_recipient_balance.is_zero() {
            profile.creator_coin.num_holders += 1;
        }

        undo.push(UndoOperation::BalanceEntryChanged(sender_key, false, Some(sender_balance)));
        self.creator_coin_balances.put(
            sender_key,
            BalanceEntry {
                balance: new_sender_balance,
                has_purchased: sender_balance.has_purchased,
            },
        );
        undo.push(UndoOperation::BalanceEntryChanged(recipient_key, false, Some(recipient_balance)));
        self.creator_coin_balances.put(
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
