//! `PrivateMessage` and `MessagingGroup` (spec §4.3).

use chain_types::{wire, Pkid, PublicKeyBytes};

use crate::constants::{DEFAULT_MESSAGING_GROUP_NAME, MESSAGING_GROUP_NAME_MAX_LEN, MESSAGING_GROUP_NAME_MIN_LEN, MESSAGING_GROUP_NAME_WIRE_WIDTH};
use crate::entries::{MessageEntry, MessageKey, MessageVersion, MessagingGroupEntry, MessagingGroupKey, MessagingGroupMember};
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

fn padded_name(name: &[u8]) -> Result<[u8; MESSAGING_GROUP_NAME_WIRE_WIDTH], RuleError> {
    let padded = wire::pad_name(name, MESSAGING_GROUP_NAME_WIRE_WIDTH).map_err(|_| RuleError::MessagingGroupNameInvalid)?;
    padded.try_into().map_err(|_| RuleError::MessagingGroupNameInvalid)
}

impl View {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn connect_private_message(
        &mut self,
        txn: &Transaction,
        recipient: Pkid,
        ciphertext: &[u8],
        timestamp_nanos: u64,
        version: MessageVersion,
        sender_messaging_public_key: Option<PublicKeyBytes>,
        recipient_messaging_public_key: Option<PublicKeyBytes>,
        sender_messaging_group_key_name: Option<Vec<u8>>,
        recipient_messaging_group_key_name: Option<Vec<u8>>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let sender = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        if matches!(version, MessageVersion::Group) && (sender_messaging_public_key.is_none() || recipient_messaging_public_key.is_none()) {
            return Err(RuleError::MessageVersionInvalid);
        }

        let key = MessageKey { recipient, timestamp_nanos };
        let store = std::rc::Rc::clone(&self.store);
        if self.messages.get(&key, || store.fetch_message(&key)).is_some() {
            return Err(RuleError::MessageTimestampCollision);
        }

        undo.push(UndoOperation::MessageChanged(key, None));
        self.messages.put(
            key,
            MessageEntry {
                sender,
                recipient,
                ciphertext: ciphertext.to_vec(),
                timestamp_nanos,
                version,
                sender_messaging_public_key,
                recipient_messaging_public_key,
                sender_messaging_group_key_name,
                recipient_messaging_group_key_name,
            },
        );

        Ok(undo)
    }

    pub(crate) fn connect_messaging_group(
        &mut self,
        txn: &Transaction,
        group_key_name: &[u8],
        group_messaging_public_key: PublicKeyBytes,
        new_members: &[(Pkid, Vec<u8>)],
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let owner = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        if group_key_name.len() < MESSAGING_GROUP_NAME_MIN_LEN || group_key_name.len() > MESSAGING_GROUP_NAME_MAX_LEN {
            return Err(RuleError::MessagingGroupNameInvalid);
        }
        // the reserved default-key name always carries the owner's own signing key as its group key.
        if group_key_name == DEFAULT_MESSAGING_GROUP_NAME.as_bytes() && group_messaging_public_key != txn.public_key {
            return Err(RuleError::MessagingGroupReservedName);
        }

        let group_key_name_padded = padded_name(group_key_name)?;
        let key = MessagingGroupKey {
            owner,
            group_key_name_padded,
        };
        let store = std::rc::Rc::clone(&self.store);
        let existing = self.messaging_groups.get(&key, || store.fetch_messaging_group(&key)).cloned();

        let mut members = existing.as_ref().map(|g| g.members.clone()).unwrap_or_default();
        for (member, encrypted_group_private_key) in new_members {
            if members.iter().any(|m| m.member == *member) {
                continue;
            }
            members.push(MessagingGroupMember {
                member: *member,
                encrypted_group_private_key: encrypted_group_private_key.clone(),
            });
        }

        undo.push(UndoOperation::MessagingGroupChanged(key, existing));
        self.messaging_groups.put(
            key,
            MessagingGroupEntry {
                owner,
                group_key_name_padded,
                group_messaging_public_key,
                members,
            },
        );

        Ok(undo)
    }
}
