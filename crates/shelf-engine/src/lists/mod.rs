//! Reading-list synchronisation: finding the current list event, merging a
//! change into it, republishing, and keeping the three lists exclusive.

mod coordinator;
mod publisher;
mod state;

pub use coordinator::{
  AddOutcome, Cleanup, CleanupResult, MoveOutcome, ReadingLists, RemoveOutcome,
};
pub use publisher::{Upsert, create, upsert};
pub use state::{fetch_latest, fetch_latest_kind};
