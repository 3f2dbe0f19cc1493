//! [`ReadingLists`]: list mutations for the current user, including the
//! cross-list exclusivity rule.

use serde::Serialize;
use shelf_core::{
  book::{Book, Isbn},
  event::Event,
  kind::ListKind,
  merge::{MergeOutcome, Mutation, merge},
  transport::Transport,
};

use super::publisher::{Upsert, create, upsert};
use crate::{Result, SyncContext, error::require_isbn};

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddOutcome {
  /// `true` if an existing list event was republished, `false` if the list
  /// had to be created.
  pub updated:         bool,
  pub already_present: bool,
  /// The list event now authoritative for the target list.
  pub event:           Event,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "event", rename_all = "snake_case")]
pub enum RemoveOutcome {
  Removed(Event),
  /// The list exists but does not hold the book; nothing was published.
  NotPresent,
  /// The user has no event for this list at all.
  NoList,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupResult {
  Removed { event_id: String },
  NotPresent,
  NoList,
  Failed { error: String },
}

/// One removal attempted from a list other than the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cleanup {
  pub list:   ListKind,
  pub result: CleanupResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
  pub list:    ListKind,
  pub added:   AddOutcome,
  pub cleanup: Vec<Cleanup>,
}

impl MoveOutcome {
  /// Whether every cleanup removal went through. A `false` here means the
  /// book may still be listed on another list.
  pub fn fully_clean(&self) -> bool {
    self
      .cleanup
      .iter()
      .all(|c| !matches!(c.result, CleanupResult::Failed { .. }))
  }
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

/// Mutates the current user's three reading lists.
///
/// Every mutation starts from a fresh read of the list it touches. There is
/// no local locking: two clients racing on one list resolve by newest
/// `created_at`.
pub struct ReadingLists<T> {
  ctx: SyncContext<T>,
}

impl<T: Transport> ReadingLists<T> {
  pub fn new(ctx: SyncContext<T>) -> Self { Self { ctx } }

  /// Put `isbn` on `list`, creating the list if the user has none.
  pub async fn add(&self, isbn: &Isbn, list: ListKind) -> Result<AddOutcome> {
    let upserted = upsert(&self.ctx, list, |tags| merge(tags, isbn, Mutation::Add)).await?;
    let updated = upserted.updated();
    match upserted {
      Upsert::Updated { event, outcome } => Ok(AddOutcome {
        updated,
        already_present: outcome == MergeOutcome::AlreadyPresent,
        event,
      }),
      // Adding is never a no-op merge; kept total for the type's sake.
      Upsert::Unchanged(event) => Ok(AddOutcome {
        updated,
        already_present: true,
        event,
      }),
      Upsert::Missing => {
        let event = create(&self.ctx, list, isbn).await?;
        Ok(AddOutcome {
          updated,
          already_present: false,
          event,
        })
      }
    }
  }

  /// Take `book` off `list`.
  pub async fn remove(&self, book: &Book, list: ListKind) -> Result<RemoveOutcome> {
    let isbn = require_isbn(book)?;
    self.remove_isbn(isbn, list).await
  }

  pub async fn remove_isbn(&self, isbn: &Isbn, list: ListKind) -> Result<RemoveOutcome> {
    let upserted =
      upsert(&self.ctx, list, |tags| merge(tags, isbn, Mutation::Remove)).await?;
    Ok(match upserted {
      Upsert::Updated { event, .. } => RemoveOutcome::Removed(event),
      Upsert::Unchanged(_) => RemoveOutcome::NotPresent,
      Upsert::Missing => RemoveOutcome::NoList,
    })
  }

  /// Move `book` onto `target`.
  ///
  /// First removes the book from whichever other list its known status
  /// names, then adds it to `target`. A failed removal is logged and
  /// reported in the outcome but does not stop the add; a failed add is an
  /// error.
  pub async fn move_to_list(&self, book: &Book, target: ListKind) -> Result<MoveOutcome> {
    let isbn = require_isbn(book)?;

    let mut cleanup = Vec::new();
    for other in target.others() {
      if book.current_list() != Some(other) {
        continue;
      }
      let result = match self.remove_isbn(isbn, other).await {
        Ok(RemoveOutcome::Removed(event)) => CleanupResult::Removed { event_id: event.id },
        Ok(RemoveOutcome::NotPresent) => CleanupResult::NotPresent,
        Ok(RemoveOutcome::NoList) => CleanupResult::NoList,
        Err(e) => {
          tracing::warn!(list = %other, %isbn, error = %e, "failed to remove book from previous list");
          CleanupResult::Failed {
            error: e.to_string(),
          }
        }
      };
      cleanup.push(Cleanup {
        list: other,
        result,
      });
    }

    let added = self.add(isbn, target).await?;
    Ok(MoveOutcome {
      list: target,
      added,
      cleanup,
    })
  }
}
