//! Connection registry for Matchwire.
//!
//! This crate answers two addressing questions the coordinator keeps
//! asking:
//!
//! 1. **Identity addressing** — "send this to player X", whichever
//!    connection(s) X currently has open ([`ConnectionRegistry::send_to_player`]).
//! 2. **Room addressing** — "send this to everyone in session S's room,
//!    except maybe one connection" ([`ConnectionRegistry::broadcast_to_room`]).
//!
//! Nothing here is persistent: the registry is rebuilt from nothing when
//! the process restarts, which is why the move-log recovery protocol
//! exists at the coordinator layer.
//!
//! The crate also hosts the [`IdentityVerifier`] trait — the boundary to
//! the external authentication collaborator that turns a registration
//! claim into a trusted [`PlayerId`](matchwire_protocol::PlayerId).

#![allow(async_fn_in_trait)]

mod error;
mod registry;
mod verify;

pub use error::RegistryError;
pub use registry::{ConnectionRegistry, EventSender};
pub use verify::{DevVerifier, IdentityVerifier, RegisterClaim};
