//! Undo journal for atomic multi-row writes.
//!
//! Deleting a user touches four tables. The cascade is planned up front as a
//! list of [`CascadeStep`]s, applied one by one while each removed row is
//! recorded together with its position. If any step fails the journal is
//! replayed in reverse, restoring every row at its original index.

use plexus_storage::{EntityKind, Post, Profile, StorageError, SubscriptionEdge, User};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::Tables;

/// A single row removal within a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CascadeStep {
    RemoveEdge(SubscriptionEdge),
    RemovePost(Uuid),
    RemoveProfile(Uuid),
    RemoveUser(Uuid),
}

/// A removed row and the index it occupied.
#[derive(Debug, Clone)]
enum UndoEntry {
    User(usize, User),
    Post(usize, Post),
    Profile(usize, Profile),
    Edge(usize, SubscriptionEdge),
}

#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: Vec<UndoEntry>,
}

impl Journal {
    /// Applies one step, recording how to undo it.
    fn apply(&mut self, tables: &mut Tables, step: CascadeStep) -> Result<(), StorageError> {
        match step {
            CascadeStep::RemoveEdge(edge) => {
                let (index, edge) = tables.edges.shift_remove_full(&edge).ok_or_else(|| {
                    StorageError::not_found(
                        EntityKind::Subscription,
                        format!("{}:{}", edge.subscriber_id, edge.author_id),
                    )
                })?;
                self.entries.push(UndoEntry::Edge(index, edge));
            }
            CascadeStep::RemovePost(id) => {
                let (index, _, post) = tables
                    .posts
                    .shift_remove_full(&id)
                    .ok_or_else(|| StorageError::not_found(EntityKind::Post, id))?;
                self.entries.push(UndoEntry::Post(index, post));
            }
            CascadeStep::RemoveProfile(id) => {
                let (index, _, profile) = tables
                    .profiles
                    .shift_remove_full(&id)
                    .ok_or_else(|| StorageError::not_found(EntityKind::Profile, id))?;
                self.entries.push(UndoEntry::Profile(index, profile));
            }
            CascadeStep::RemoveUser(id) => {
                let (index, _, user) = tables
                    .users
                    .shift_remove_full(&id)
                    .ok_or_else(|| StorageError::not_found(EntityKind::User, id))?;
                self.entries.push(UndoEntry::User(index, user));
            }
        }
        Ok(())
    }

    /// Restores every recorded row, newest first.
    fn rollback(self, tables: &mut Tables) {
        for entry in self.entries.into_iter().rev() {
            match entry {
                UndoEntry::User(index, user) => {
                    tables.users.shift_insert(index, user.id, user);
                }
                UndoEntry::Post(index, post) => {
                    tables.posts.shift_insert(index, post.id, post);
                }
                UndoEntry::Profile(index, profile) => {
                    tables.profiles.shift_insert(index, profile.id, profile);
                }
                UndoEntry::Edge(index, edge) => {
                    tables.edges.shift_insert(index, edge);
                }
            }
        }
    }
}

/// Plans the removal of a user and everything that depends on it.
///
/// Dependents come first so the user row is the last thing removed.
pub(crate) fn plan_user_cascade(tables: &Tables, user_id: Uuid) -> Vec<CascadeStep> {
    let mut steps: Vec<CascadeStep> = tables
        .edges
        .iter()
        .filter(|e| e.subscriber_id == user_id || e.author_id == user_id)
        .map(|e| CascadeStep::RemoveEdge(*e))
        .collect();

    steps.extend(
        tables
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| CascadeStep::RemovePost(p.id)),
    );

    if let Some(profile) = tables.profile_of_user(user_id) {
        steps.push(CascadeStep::RemoveProfile(profile.id));
    }

    steps.push(CascadeStep::RemoveUser(user_id));
    steps
}

/// Applies `steps` atomically: all of them, or none.
pub(crate) fn apply_atomically(
    tables: &mut Tables,
    steps: &[CascadeStep],
) -> Result<(), StorageError> {
    let mut journal = Journal::default();

    for (position, step) in steps.iter().enumerate() {
        if let Err(e) = journal.apply(tables, *step) {
            warn!(
                step = position,
                total = steps.len(),
                error = %e,
                "Cascade step failed, rolling back"
            );
            journal.rollback(tables);
            return Err(StorageError::transaction_error(format!(
                "cascade aborted at step {} of {}: {e}",
                position + 1,
                steps.len()
            )));
        }
    }

    debug!(steps = steps.len(), "Cascade committed");
    Ok(())
}
