//! `AuthorizeDerivedKey` (spec §4.3, state machine "Derived key" in §4.3).
//! Must be signed by the owner key itself, never by the derived key it names.

use chain_types::PublicKeyBytes;

use crate::entries::{DerivedKeyAuthorizationState, DerivedKeyEntry, DerivedKeyMapKey};
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

impl View {
    pub(crate) fn connect_authorize_derived_key(
        &mut self,
        txn: &Transaction,
        derived_public_key: PublicKeyBytes,
        expiration_block: u64,
        state: DerivedKeyAuthorizationState,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        if txn.derived_public_key.is_some() {
            return Err(RuleError::DerivedKeyOwnerSignatureRequired);
        }

        let map_key = DerivedKeyMapKey {
            owner: txn.public_key,
            derived: derived_public_key,
        };
        let store = std::rc::Rc::clone(&self.store);
        let existing = self.derived_keys.get(&map_key, || store.fetch_derived_key(&map_key)).cloned();
        if let Some(prior) = &existing {
            if matches!(prior.state, DerivedKeyAuthorizationState::Revoked) && matches!(state, DerivedKeyAuthorizationState::Valid) {
                return Err(RuleError::DerivedKeyRevoked);
            }
        }

        let mut undo = Vec::new();
        undo.push(UndoOperation::DerivedKeyChanged(map_key, existing));
        self.derived_keys.put(
            map_key,
            DerivedKeyEntry {
                owner: txn.public_key,
                derived: derived_public_key,
                expiration_block,
                state,
            },
        );
        Ok(undo)
    }
}
