//! Review workflow for imported records flagged as needing human confirmation.
//!
//! - `types`: the wire-level shapes (queue rows, actions, updates)
//! - `queue`: the in-memory walk over flagged items (pure state machine)
//! - `session`: drives the queue against a backend, one round trip per action

pub mod queue;
pub mod session;
pub mod types;

pub use queue::{QueueProgress, ReviewDraft, ReviewQueue};
pub use session::{ReviewClient, ReviewError, ReviewSession};
pub use types::{ReviewAction, ReviewItem, ReviewRequest, ReviewUpdates, sort_review_queue};
