//! Message Thread Engine: the ordered message log of one project.
//!
//! Owns messages, reply linkage, pin status and reactions. Messages are
//! appended in arrival order and never reordered or physically removed;
//! deletion leaves a tombstone so reply chains stay resolvable.

use crate::domain::errors::ProjectError;
use crate::domain::types::{MessageId, ParticipantId, ReactionKind, Role, TimestampUtc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Body substituted for a soft-deleted message.
pub const TOMBSTONE_BODY: &str = "[message deleted]";

/// A single message in the project thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: ParticipantId,
    pub author_role: Role,
    pub body: String,
    /// Back-reference to the message this one replies to. Always resolves
    /// within the project: dangling references are rejected at write time.
    pub reply_to: Option<MessageId>,
    pub pinned: bool,
    /// Tombstone flag. Deleted messages keep their id so replies referencing
    /// them resolve to a tombstone marker rather than dangling.
    pub deleted: bool,
    /// Reactions keyed by kind; the count of a kind is the size of its
    /// participant set. Kinds with no remaining participants are removed.
    pub reactions: BTreeMap<ReactionKind, BTreeSet<ParticipantId>>,
    pub created_at: TimestampUtc,
}

impl Message {
    /// Returns true if the given participant already reacted with `kind`.
    pub fn has_reaction(&self, participant: &ParticipantId, kind: &ReactionKind) -> bool {
        self.reactions
            .get(kind)
            .is_some_and(|set| set.contains(participant))
    }

    /// Returns the reaction count for `kind` (0 when the kind is absent).
    pub fn reaction_count(&self, kind: &ReactionKind) -> usize {
        self.reactions.get(kind).map_or(0, BTreeSet::len)
    }
}

/// The ordered message log of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageThread {
    messages: Vec<Message>,
}

impl MessageThread {
    /// Returns all messages in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Looks up a message by id.
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == *id)
    }

    fn message_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == *id)
    }

    /// Looks up a message by id, failing with `NotFound` when unknown.
    pub fn require(&self, id: &MessageId) -> Result<&Message, ProjectError> {
        self.message(id).ok_or_else(|| ProjectError::NotFound {
            message: format!("message {} does not exist in this project", id),
        })
    }

    /// Looks up a live (non-tombstone) message, failing with `NotFound` when
    /// the id is unknown or the message was deleted.
    pub fn require_live(&self, id: &MessageId) -> Result<&Message, ProjectError> {
        let message = self.require(id)?;
        if message.deleted {
            return Err(ProjectError::NotFound {
                message: format!("message {} has been deleted", id),
            });
        }
        Ok(message)
    }

    /// Validates a reply target before a post is accepted.
    ///
    /// Dangling references are rejected here rather than silently dropped.
    /// Self-reference is impossible because ids are engine-assigned after
    /// this check, which also keeps reply chains acyclic by construction.
    pub fn validate_reply_target(&self, reply_to: &MessageId) -> Result<(), ProjectError> {
        if self.message(reply_to).is_none() {
            return Err(ProjectError::InvalidReference {
                message: format!("reply target {} does not exist in this project", reply_to),
            });
        }
        Ok(())
    }

    /// Returns all pinned messages in thread order. No exclusivity is
    /// enforced; consumers choose how many pins to surface.
    pub fn pinned_messages(&self) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.pinned).collect()
    }

    /// Walks `reply_to` links starting at `id`, including the starting
    /// message. Traversal stops when a link is absent or when a tombstone is
    /// reached (the tombstone itself is included so consumers can surface a
    /// deletion marker). Reply links are acyclic by construction; the message
    /// count bound is a hard stop regardless.
    pub fn reply_chain(&self, id: &MessageId) -> Vec<&Message> {
        let mut chain = Vec::new();
        let mut current = self.message(id);
        while let Some(message) = current {
            chain.push(message);
            if message.deleted || chain.len() >= self.messages.len() {
                break;
            }
            current = message
                .reply_to
                .as_ref()
                .and_then(|next| self.message(next));
        }
        chain
    }

    // ========== Event application ==========
    //
    // Infallible mutations driven by applied events. Unknown ids are ignored:
    // events are validated before they are committed.

    pub(crate) fn apply_posted(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn apply_reaction_added(
        &mut self,
        id: &MessageId,
        participant: ParticipantId,
        kind: ReactionKind,
    ) {
        if let Some(message) = self.message_mut(id) {
            message.reactions.entry(kind).or_default().insert(participant);
        }
    }

    pub(crate) fn apply_reaction_removed(
        &mut self,
        id: &MessageId,
        participant: &ParticipantId,
        kind: &ReactionKind,
    ) {
        if let Some(message) = self.message_mut(id) {
            if let Some(set) = message.reactions.get_mut(kind) {
                set.remove(participant);
                if set.is_empty() {
                    message.reactions.remove(kind);
                }
            }
        }
    }

    pub(crate) fn apply_pin_changed(&mut self, id: &MessageId, pinned: bool) {
        if let Some(message) = self.message_mut(id) {
            message.pinned = pinned;
        }
    }

    pub(crate) fn apply_deleted(&mut self, id: &MessageId) {
        if let Some(message) = self.message_mut(id) {
            message.body = TOMBSTONE_BODY.to_string();
            message.deleted = true;
            message.reactions.clear();
        }
    }
}
