//! Durable per-player statistics for the Quizzard engine.
//!
//! The engine records outcomes and session completions through the
//! [`StatsStore`](quizzard_engine::StatsStore) trait; this crate provides
//! the reference in-memory implementation plus read-side aggregation:
//!
//! - [`store`]: the append-only [`MemoryStatsStore`] and the recorded
//!   history types it serializes
//! - [`summary`]: [`PlayerSummary`], an aggregate view with per-category
//!   accuracy derived on read
//!
//! # Examples
//!
//! ```
//! use quizzard_engine::{ContentId, Outcome, OutcomeRecord, StatsStore as _, UserId};
//! use quizzard_stats::{MemoryStatsStore, PlayerSummary};
//!
//! let mut store = MemoryStatsStore::new();
//! let user = UserId::new("alice");
//! store.record_outcome(
//!     &user,
//!     OutcomeRecord {
//!         content_id: ContentId::new("c1"),
//!         outcome: Outcome::Correct,
//!         points_earned: 3,
//!         points_possible: 3,
//!     },
//! );
//!
//! let history = store.history(&user).unwrap();
//! let summary = PlayerSummary::new(history, |_| Some("HISTORY".to_owned())).unwrap();
//! assert_eq!(summary.correct, 1);
//! assert_eq!(summary.accuracy(), 1.0);
//! ```

pub use self::{store::*, summary::*};

pub mod store;
pub mod summary;
