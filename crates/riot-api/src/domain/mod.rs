//! Domain types produced by the fetcher.
//!
//! These are decoupled from the upstream wire format; see [`crate::wire`] for
//! the payloads they are built from.

mod game;
mod profile;
mod rank;

pub use game::{
    Kda, MatchOutcome, MatchRecord, ParticipantRecord, QueueKind, REMAKE_THRESHOLD_SECS, Side,
};
pub use profile::{MasteryEntry, PlayerSummary, Snapshot, TOP_MASTERY_COUNT, unranked_map};
pub use rank::{Division, Queue, RankValue, Tier};
