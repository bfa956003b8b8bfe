//! Wire protocol for Matchwire.
//!
//! This crate defines the "language" that clients and the lobby server
//! speak:
//!
//! - **Identifiers** ([`PlayerId`], [`SessionId`]) — durable player
//!   identity and game-session identity.
//! - **Types** ([`BoardConfig`], [`MoveRecord`], [`Outcome`]) — the data
//!   that travels inside events.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — every message on the
//!   wire, tagged with its kebab-case event name.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events are converted
//!   to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the
//! coordinator (session state). It doesn't know about connections or
//! sessions — it only knows how to describe and serialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Coordinator (session state)
//! ```

mod codec;
mod error;
mod events;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};
pub use types::{
    BoardConfig, Density, MoveRecord, Outcome, PlayerId, SessionId,
};
