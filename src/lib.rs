//! Live tennis-style match scoring with bounded undo and an append-only event journal.
//!
//! # Examples
//!
//! Synchronous scoring with [`core::session::MatchSession`]:
//! ```
//! use matchscore::{
//!     core::session::MatchSession,
//!     format::format_points,
//!     types::{MatchId, PlayerId, PointKind, Slot},
//! };
//!
//! let mut session = MatchSession::start(
//!     MatchId::new("m-1"),
//!     PlayerId::new("alice"),
//!     PlayerId::new("bob"),
//! ).expect("start");
//!
//! for _ in 0..4 {
//!     session.award_point(Slot::SlotA, PointKind::Ace).expect("point");
//! }
//! assert_eq!(session.state().games.a, 1);
//! assert_eq!(session.state().serving, Slot::SlotB);
//!
//! let state = session.undo().expect("undo");
//! assert_eq!(format_points(state.points.a, state.deuce, state.advantage, Slot::SlotA), "40");
//! ```
//!
//! Runtime usage with SQLite sink:
//! ```no_run
//! use matchscore::{
//!     persist::sqlite::SqliteEventSink,
//!     runtime::handle::{start_match, RuntimeConfig},
//!     types::{MatchId, PlayerId, PointKind, Slot},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = SqliteEventSink::open("matches.db").expect("open sqlite");
//! let handle = start_match(
//!     MatchId::new("m-1"),
//!     PlayerId::new("alice"),
//!     PlayerId::new("bob"),
//!     Some(Box::new(sink)),
//!     RuntimeConfig::default(),
//! ).expect("start");
//! let applied = handle.award_point(Slot::SlotA, PointKind::Winner).await.expect("point");
//! assert!(applied.emit_warning.is_none());
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Scoring engine, undo history, event emitter and match session.
pub mod core;
/// Read-only player directory.
pub mod directory;
/// Match event model and persistence wrapper types.
pub mod event;
/// Point labels and scoreboard rendering.
pub mod format;
/// Persistence abstraction and SQLite implementation.
pub mod persist;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Score state and final result types.
pub mod score;
/// Shared primitive types and enums.
pub mod types;
