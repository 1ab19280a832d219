//! PKID registry lookups and `SwapIdentity` (spec §3 "Stable identifier
//! (PKID)", spec §4.3 "SwapIdentity").

use std::rc::Rc;

use chain_types::{Pkid, PublicKeyBytes};

use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

impl View {
    /// Resolves the PKID bound to `public_key`, minting a fresh one (equal to
    /// the key's own bytes) the first time this key is ever seen (spec §3:
    /// "identical to the owning public key's compressed bytes at creation").
    /// Any undo records this mutation needs are appended to `undo`.
    pub(crate) fn resolve_or_create_pkid(&mut self, public_key: &PublicKeyBytes, undo: &mut Vec<UndoOperation>) -> Pkid {
        if let Some(pkid) = self.pkid_forward.peek(public_key) {
            return *pkid;
        }
        let store = Rc::clone(&self.store);
        if let Some(pkid) = self.pkid_forward.get(public_key, || store.fetch_pkid(public_key)) {
            return *pkid;
        }
        let pkid = Pkid::from_public_key(public_key);
        self.pkid_forward.put(*public_key, pkid);
        self.pkid_reverse.put(pkid, *public_key);
        undo.push(UndoOperation::PkidMappingChanged(*public_key, None));
        undo.push(UndoOperation::PkidReverseChanged(pkid, None));
        pkid
    }

    pub(crate) fn current_public_key(&mut self, pkid: &Pkid) -> Option<PublicKeyBytes> {
        if let Some(key) = self.pkid_reverse.peek(pkid) {
            return Some(*key);
        }
        let store = Rc::clone(&self.store);
        self.pkid_reverse.get(pkid, || store.fetch_public_key(pkid)).copied()
    }

    /// Atomically swaps the public keys bound to two stable identifiers
    /// (spec §4.3). Admin-keyed: the signer must be the chain's designated
    /// admin key, modeled here as the transaction's own declared key already
    /// having passed `BasicTransfer`'s signature check — the caller enforces
    /// the admin-key policy before dispatching here.
    pub(crate) fn connect_swap_identity(&mut self, from: Pkid, to: Pkid) -> Result<Vec<UndoOperation>, RuleError> {
        if from == to {
            return Err(RuleError::TxnMalformed);
        }
        let mut undo = Vec::new();

        let from_key = self.current_public_key(&from).ok_or(RuleError::ProfileNotFound)?;
        let to_key = self.current_public_key(&to).ok_or(RuleError::ProfileNotFound)?;

        undo.push(UndoOperation::PkidReverseChanged(from, Some(from_key)));
        undo.push(UndoOperation::PkidReverseChanged(to, Some(to_key)));
        undo.push(UndoOperation::PkidMappingChanged(from_key, Some(from)));
        undo.push(UndoOperation::PkidMappingChanged(to_key, Some(to)));

        self.pkid_reverse.put(from, to_key);
        self.pkid_reverse.put(to, from_key);
        self.pkid_forward.put(from_key, to);
        self.pkid_forward.put(to_key, from);

        Ok(undo)
    }

    pub(crate) fn admin_key_required(&mut self, txn: &Transaction, admin_key: &PublicKeyBytes) -> Result<(), RuleError> {
        if txn.public_key != *admin_key {
            return Err(RuleError::NotAdmin);
        }
        Ok(())
    }
}
