//! `UpdateProfile` (spec §4.3): reserve a username, pay the one-time profile
//! fee, set description/image/hidden, and preserve both `CoinEntry`
//! sub-records untouched.

use chain_types::Pkid;

use crate::entries::{CoinEntry, ProfileEntry};
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 32
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl View {
    pub(crate) fn connect_update_profile(
        &mut self,
        txn: &Transaction,
        username: &str,
        description: &str,
        profile_image: &[u8],
        hidden: bool,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        if !is_valid_username(username) {
            return Err(RuleError::UsernameInvalid);
        }
        let username_lower = username.to_ascii_lowercase();

        let mut undo = Vec::new();
        let pkid = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let store = std::rc::Rc::clone(&self.store);
        let existing = self.profiles.get(&pkid, || store.fetch_profile(&pkid)).cloned();

        let existing_owner = self
            .username_owners
            .get(&username_lower, || store.fetch_username_owner(&username_lower))
            .copied();
        if let Some(owner) = existing_owner {
            if owner != pkid {
                return Err(RuleError::UsernameTaken);
            }
        }

        let is_first_profile = existing.is_none();
        if is_first_profile {
            let fee = self.global_params().profile_creation_fee_base_units;
            if fee > 0 && !txn.outputs.iter().any(|o| o.amount_base_units > 0) {
                return Err(RuleError::ProfileFeeNotPaid);
            }
        }

        if let Some(prior) = &existing {
            if prior.username.to_ascii_lowercase() != username_lower {
                undo.push(UndoOperation::UsernameOwnerChanged(prior.username.to_ascii_lowercase(), Some(pkid)));
                self.username_owners.delete(prior.username.to_ascii_lowercase());
            }
        }
        if existing_owner != Some(pkid) {
            undo.push(UndoOperation::UsernameOwnerChanged(username_lower.clone(), existing_owner));
            self.username_owners.put(username_lower, pkid);
        }

        undo.push(UndoOperation::ProfileChanged(pkid, existing.clone()));
        let (creator_coin, dao_coin) = match &existing {
            Some(prior) => (prior.creator_coin.clone(), prior.dao_coin.clone()),
            None => (CoinEntry::new_creator_coin(), CoinEntry::new_dao_coin()),
        };
        self.profiles.put(
            pkid,
            ProfileEntry {
                public_key: txn.public_key,
                username: username.to_string(),
                description: description.to_string(),
                profile_image: profile_image.to_vec(),
                hidden,
                creator_coin,
                dao_coin,
            },
        );

        Ok(undo)
    }

    pub(crate) fn require_profile(&mut self, pkid: &Pkid) -> Result<ProfileEntry, RuleError> {
        let store = std::rc::Rc::clone(&self.store);
        self.profiles.get(pkid, || store.fetch_profile(pkid)).cloned().ok_or(RuleError::ProfileNotFound)
    }
}
