//! The connection registry: identity bindings and room membership.

use std::collections::{HashMap, HashSet};

use matchwire_protocol::{PlayerId, ServerEvent, SessionId};
use matchwire_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::RegistryError;

/// Channel sender for delivering outbound events to one connection's
/// writer task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// One live connection's binding.
struct Binding {
    player: PlayerId,
    sender: EventSender,
}

/// Maps durable player identities to live connections, and sessions to
/// the set of connections subscribed to their broadcasts (the "room").
///
/// Three maps, kept in sync by the mutation methods:
/// - `connections`: connection → (player, outbound channel)
/// - `players`: player → connections (a player with two tabs open has
///   two entries here)
/// - `rooms`: session → connections
///
/// # Concurrency note
///
/// Like the session store, this is a plain single-owner structure: the
/// coordinator task owns it and is the only mutator, so there is no
/// locking here.
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Binding>,
    players: HashMap<PlayerId, HashSet<ConnectionId>>,
    rooms: HashMap<SessionId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            players: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    // -- Identity bindings ------------------------------------------------

    /// Binds a connection to a verified player identity.
    ///
    /// Re-binding an already-bound connection replaces its previous
    /// binding (the old identity's index entry is cleaned up). Room
    /// memberships survive a re-bind — they are keyed by connection.
    pub fn bind(
        &mut self,
        conn: ConnectionId,
        player: PlayerId,
        sender: EventSender,
    ) {
        if let Some(old) = self.connections.remove(&conn) {
            self.remove_player_index(&old.player, conn);
        }
        self.players.entry(player.clone()).or_default().insert(conn);
        self.connections.insert(conn, Binding { player: player.clone(), sender });
        tracing::info!(%conn, %player, "connection bound");
    }

    /// Removes one connection's binding and room memberships.
    ///
    /// Called on disconnect. Never touches session state — a player who
    /// reconnects re-registers and recovers via the move log.
    pub fn unbind(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let binding = self.connections.remove(&conn)?;
        self.remove_player_index(&binding.player, conn);
        for members in self.rooms.values_mut() {
            members.remove(&conn);
        }
        tracing::info!(%conn, player = %binding.player, "connection unbound");
        Some(binding.player)
    }

    /// Returns the identity a connection is bound to, if any.
    pub fn player_of(&self, conn: ConnectionId) -> Option<&PlayerId> {
        self.connections.get(&conn).map(|b| &b.player)
    }

    /// Returns `true` if the connection has an identity binding.
    pub fn is_bound(&self, conn: ConnectionId) -> bool {
        self.connections.contains_key(&conn)
    }

    /// Number of live bindings.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // -- Delivery ---------------------------------------------------------

    /// Sends an event to every connection bound to `player`.
    ///
    /// Returns how many connections it reached — zero when the player is
    /// offline (not an error; an offline invitee simply misses the
    /// notification). Dead connections found along the way are pruned.
    pub fn send_to_player(
        &mut self,
        player: &PlayerId,
        event: &ServerEvent,
    ) -> usize {
        let conns: Vec<ConnectionId> = self
            .players
            .get(player)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();

        let mut delivered = 0;
        for conn in conns {
            match self.deliver(conn, event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(%conn, %player, error = %e, "dropping dead connection");
                    self.unbind(conn);
                }
            }
        }
        delivered
    }

    /// Sends an event to a single connection.
    ///
    /// # Errors
    /// [`RegistryError::NotRegistered`] if the connection is unknown,
    /// [`RegistryError::DeliveryFailed`] if its channel is closed.
    pub fn send_to_conn(
        &mut self,
        conn: ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), RegistryError> {
        if !self.connections.contains_key(&conn) {
            return Err(RegistryError::NotRegistered(conn));
        }
        self.deliver(conn, event).inspect_err(|e| {
            tracing::warn!(%conn, error = %e, "dropping dead connection");
            self.unbind(conn);
        })
    }

    // -- Rooms ------------------------------------------------------------

    /// Subscribes a connection to a session's broadcasts.
    pub fn join_room(&mut self, conn: ConnectionId, session: &SessionId) {
        self.rooms
            .entry(session.clone())
            .or_default()
            .insert(conn);
        tracing::debug!(%conn, %session, "joined room");
    }

    /// Sends an event to every room member, optionally excluding one
    /// connection (typically the originator, which already has local
    /// authoritative state).
    ///
    /// Delivery is best-effort per member: a dead connection is logged,
    /// pruned, and the broadcast continues — one unreachable client must
    /// never cost the rest of the room its event.
    ///
    /// Returns how many connections it reached.
    pub fn broadcast_to_room(
        &mut self,
        session: &SessionId,
        event: &ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let members: Vec<ConnectionId> = self
            .rooms
            .get(session)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();

        let mut delivered = 0;
        for conn in members {
            if Some(conn) == exclude {
                continue;
            }
            match self.deliver(conn, event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        %conn, %session, error = %e,
                        "relay delivery failed, skipping member"
                    );
                    self.unbind(conn);
                }
            }
        }
        delivered
    }

    /// Removes a session's room entirely. Member bindings are untouched.
    pub fn drop_room(&mut self, session: &SessionId) {
        if self.rooms.remove(session).is_some() {
            tracing::debug!(%session, "room dropped");
        }
    }

    /// Connections currently subscribed to a session's room.
    pub fn room_size(&self, session: &SessionId) -> usize {
        self.rooms.get(session).map_or(0, HashSet::len)
    }

    /// Returns `true` if the connection is a member of the room.
    pub fn in_room(&self, conn: ConnectionId, session: &SessionId) -> bool {
        self.rooms
            .get(session)
            .is_some_and(|members| members.contains(&conn))
    }

    // -- Internals --------------------------------------------------------

    fn deliver(
        &self,
        conn: ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), RegistryError> {
        let binding = self
            .connections
            .get(&conn)
            .ok_or(RegistryError::NotRegistered(conn))?;
        binding
            .sender
            .send(event.clone())
            .map_err(|_| RegistryError::DeliveryFailed(conn))
    }

    fn remove_player_index(&mut self, player: &PlayerId, conn: ConnectionId) {
        if let Some(set) = self.players.get_mut(player) {
            set.remove(&conn);
            if set.is_empty() {
                self.players.remove(player);
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
