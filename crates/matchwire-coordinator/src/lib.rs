//! Live game session coordination for Matchwire.
//!
//! This crate is the in-memory authority for every active game: it runs
//! the invitation handshake, relays moves to rooms, answers recovery
//! requests from reconnecting players, and reaps abandoned sessions.
//!
//! # Key types
//!
//! - [`Coordinator`] — the single actor task that owns all session state
//! - [`CoordinatorHandle`] — send operations to the running coordinator
//! - [`Session`] / [`SessionState`] — one game and its lifecycle machine
//! - [`SessionStore`] — the table of active sessions
//! - [`CoordinatorConfig`] — reaper timeouts
//! - [`RecordStore`] — the boundary to durable game-record storage
//!
//! # Architecture
//!
//! ```text
//! connection handlers ──commands──▶ Coordinator (one task)
//!        ▲                             │ owns SessionStore
//!        └───────events (registry)─────┘ owns ConnectionRegistry
//! ```
//!
//! Every inbound event — invite, accept, move, disconnect, timer fire —
//! is a command processed to completion before the next one, so no two
//! handlers ever interleave on a session and the store needs no locks.
//! The only async work (persistence via [`RecordStore`]) is spawned
//! fire-and-forget: broadcasts never wait on the archive.

#![allow(async_fn_in_trait)]

mod config;
mod coordinator;
mod error;
mod records;
mod session;
mod store;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use error::CoordinatorError;
pub use records::{
    GameRecord, MemoryRecordStore, RecordError, RecordStatus, RecordStore,
    RecordUpdate,
};
pub use session::{AcceptOutcome, InviteStatus, Session, SessionState};
pub use store::SessionStore;
