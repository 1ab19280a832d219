//! `Follow`, `Like`, `Repost` (spec §4.3): toggleable relations. A second
//! follow/like is a no-op; un-follow/un-like is signalled by a flag; counters
//! on the followee/post adjust accordingly, and the undo record keeps the
//! exact prior counter value rather than merely decrementing on disconnect.

use chain_types::Hash256;

use crate::entries::{FollowEntry, FollowKey, LikeEntry, LikeKey, RepostEntry, RepostKey};
use crate::errors::RuleError;
use crate::txn::Transaction;
use crate::undo::UndoOperation;
use crate::view::View;

impl View {
    pub(crate) fn connect_follow(&mut self, txn: &Transaction, followed: chain_types::Pkid, is_unfollow: bool) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let follower = self.resolve_or_create_pkid(&txn.public_key, &mut undo);
        if follower == followed {
            return Err(RuleError::TxnMalformed);
        }
        let key = FollowKey { follower, followed };
        let store = std::rc::Rc::clone(&self.store);
        let existing = self.follows.get(&key, || store.fetch_follow(&key)).is_some();

        if is_unfollow {
            if !existing {
                return Ok(undo);
            }
            undo.push(UndoOperation::FollowChanged(key, Some(FollowEntry { follower, followed })));
            self.follows.delete(key);
        } else {
            if existing {
                return Ok(undo);
            }
            undo.push(UndoOperation::FollowChanged(key, None));
            self.follows.put(key, FollowEntry { follower, followed });
        }
        Ok(undo)
    }

    pub(crate) fn connect_like(&mut self, txn: &Transaction, liked_post: Hash256, is_unlike: bool) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let liker = self.resolve_or_create_pkid(&txn.public_key, &mut undo);
        let key = LikeKey { liker, liked_post };
        let store = std::rc::Rc::clone(&self.store);
        let existing = self.likes.get(&key, || store.fetch_like(&key)).is_some();

        let mut post = self.posts.get(&liked_post, || store.fetch_post(&liked_post)).cloned().ok_or(RuleError::PostNotFound)?;

        if is_unlike {
            if !existing {
                return Ok(undo);
            }
            undo.push(UndoOperation::PostChanged(liked_post, Some(post.clone())));
            post.like_count = post.like_count.saturating_sub(1);
            self.posts.put(liked_post, post);
            undo.push(UndoOperation::LikeChanged(key, Some(LikeEntry { liker, liked_post })));
            self.likes.delete(key);
        } else {
            if existing {
                return Ok(undo);
            }
            undo.push(UndoOperation::PostChanged(liked_post, Some(post.clone())));
            post.like_count += 1;
            self.posts.put(liked_post, post);
            undo.push(UndoOperation::LikeChanged(key, None));
            self.likes.put(key, LikeEntry { liker, liked_post });
        }
        Ok(undo)
    }

    pub(crate) fn connect_repost(
        &mut self,
        txn: &Transaction,
        reposted_post: Hash256,
        repost_post_hash: Hash256,
        is_quote_repost: bool,
        is_undo: bool,
    ) -> Result<Vec<UndoOperation>, RuleError> {
        let mut undo = Vec::new();
        let reposter = self.resolve_or_create_pkid(&txn.public_key, &mut undo);
        let key = RepostKey { reposter, reposted_post };
        let store = std::rc::Rc::clone(&self.store);
        let existing = self.reposts.get(&key, || store.fetch_repost(&key)).cloned();

        let mut post = self.posts.get(&reposted_post, || store.fetch_post(&reposted_post)).cloned().ok_or(RuleError::PostNotFound)?;

        if is_undo {
            let prior = existing.ok_or(RuleError::PostNotFound)?;
            undo.push(UndoOperation::PostChanged(reposted_post, Some(post.clone())));
            if prior.is_quote_repost {
                post.quote_repost_count = post.quote_repost_count.saturating_sub(1);
            } else {
                post.repost_count = post.repost_count.saturating_sub(1);
            }
            self.posts.put(reposted_post, post);
            undo.push(UndoOperation::RepostChanged(key, Some(prior)));
            self.reposts.delete(key);
        } else {
            if existing.is_some() {
                return Ok(undo);
            }
            undo.push(UndoOperation::PostChanged(reposted_post, Some(post.clone())));
            if is_quote_repost {
                post.quote_repost_count += 1;
            } else {
                post.repost_count += 1;
            }
            self.posts.put(reposted_post, post);
            undo.push(UndoOperation::RepostChanged(key, None));
            self.reposts.put(
                key,
                RepostEntry {
                    reposter,
                    reposted_post,
                    repost_post_hash,
                    is_quote_repost,
                },
            );
        }
        Ok(undo)
    }
}
