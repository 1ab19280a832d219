//! `SubmitPost` (spec §4.3): timestamps unique and client-monotonic; editing
//! preserves the original author and creation timestamp; NFT posts restrict
//! further edits once minted.

use std::collections::BTreeMap;

use chain_types::Hash256;

use crate::entries::PostEntry;
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

impl View {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn connect_submit_post(
        &mut self,
        txn: &Transaction,
        post_hash: Hash256,
        parent_post_hash: Option<Hash256>,
        reposted_post_hash: Option<Hash256>,
        content: &[u8],
        timestamp_nanos: u64,
        hidden: bool,
        pinned: bool,
        extra_data: &BTreeMap<String, Vec<u8>>,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let author = self.resolve_or_create_pkid(&txn.public_key, &mut undo);

        let store = std::rc::Rc::clone(&self.store);
        let existing = self.posts.get(&post_hash, || store.fetch_post(&post_hash)).cloned();

        let (effective_author, effective_timestamp) = match &existing {
            Some(prior) => {
                if prior.author != author {
                    return Err(RuleError::PostAuthorMismatch);
                }
                if prior.nft.is_nft {
                    return Err(RuleError::PostNftEditRestricted);
                }
                (prior.author, prior.timestamp_nanos)
            }
            None => {
                if let Some(parent) = parent_post_hash {
                    if self.posts.get(&parent, || store.fetch_post(&parent)).is_none() {
                        return Err(RuleError::PostNotFound);
                    }
                }
                (author, timestamp_nanos)
            }
        };

        if existing.is_none() {
            let timestamp_key = timestamp_nanos;
            let collides = self.posts.touched().any(|(_, slot)| {
                matches!(slot, crate::store::Slot::Live(p) if p.author == author && p.timestamp_nanos == timestamp_key)
            });
            if collides {
                return Err(RuleError::PostTimestampCollision);
            }
        }

        let (like_count, repost_count, quote_repost_count, comment_count, diamond_count, nft) = match &existing {
            Some(prior) => (
                prior.like_count,
                prior.repost_count,
                prior.quote_repost_count,
                prior.comment_count,
                prior.diamond_count,
                prior.nft.clone(),
            ),
            None => (0, 0, 0, 0, 0, Default::default()),
        };

        undo.push(UndoOperation::PostChanged(post_hash, existing));
        self.posts.put(
            post_hash,
            PostEntry {
                post_hash,
                author: effective_author,
                content: content.to_vec(),
                parent_post_hash,
                reposted_post_hash,
                like_count,
                repost_count,
                quote_repost_count,
                comment_count,
                diamond_count,
                timestamp_nanos: effective_timestamp,
                hidden,
                pinned,
                nft,
                extra_data: extra_data.clone(),
            },
        );

        Ok(undo)
    }
}
