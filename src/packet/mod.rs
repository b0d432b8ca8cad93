//! Dispatch table from `(state, packet id)` to typed handlers.

mod handlers;

use std::{collections::HashMap, net::SocketAddr};

use net::{
    decode_exact, HandshakeC2s, LoginStartC2s, PacketDecode, PacketEncode, PacketFrame,
    PacketState, ProtoError, StatusPingC2s, StatusRequestC2s,
};

use crate::{
    config::PandoraConfig,
    connection::ConnectionId,
    error::ConnectionError,
    logging::ProtocolLog,
    session::{ServerContext, SessionState},
};

/// Typed packet handler.
pub type Handler<P> = fn(&mut HandlerContext<'_>, P) -> Result<(), ConnectionError>;

type Entry = Box<dyn Fn(&mut HandlerContext<'_>, &[u8]) -> Result<(), ConnectionError> + Send + Sync>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("handler for packet {id:#04x} in state {state} registered twice")]
    Duplicate { state: PacketState, id: i32 },
}

/// Packet handlers keyed by protocol state and packet id.
///
/// Built once at startup and shared read-only by every connection.
#[derive(Default)]
pub struct PacketRegistry {
    handlers: HashMap<(PacketState, i32), Entry>,
}

impl PacketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the handshake, status and login stub handlers.
    pub fn vanilla() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry
            .register::<HandshakeC2s>(PacketState::Handshaking, handlers::handshake)?
            .register::<StatusRequestC2s>(PacketState::Status, handlers::status_request)?
            .register::<StatusPingC2s>(PacketState::Status, handlers::status_ping)?
            .register::<LoginStartC2s>(PacketState::Login, handlers::login_start)?;
        Ok(registry)
    }

    /// Registers `handler` for `P` in `state`.
    pub fn register<P>(
        &mut self,
        state: PacketState,
        handler: Handler<P>,
    ) -> Result<&mut Self, RegistryError>
    where
        P: PacketDecode + 'static,
    {
        let key = (state, P::ID);
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::Duplicate { state, id: P::ID });
        }

        let entry: Entry = Box::new(move |ctx: &mut HandlerContext<'_>, body: &[u8]| {
            handler(ctx, decode_exact::<P>(body)?)
        });
        self.handlers.insert(key, entry);
        Ok(self)
    }

    pub fn contains(&self, state: PacketState, id: i32) -> bool {
        self.handlers.contains_key(&(state, id))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Decodes `frame` and runs its handler.
    ///
    /// A frame with no handler for `state` fails with [`ProtoError::UnknownPacket`].
    pub fn dispatch(
        &self,
        state: PacketState,
        frame: &PacketFrame,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ConnectionError> {
        let Some(entry) = self.handlers.get(&(state, frame.id)) else {
            return Err(ProtoError::UnknownPacket { state, id: frame.id }.into());
        };
        entry(ctx, &frame.body)
    }
}

/// What a handler may see and change while processing one packet.
pub struct HandlerContext<'a> {
    id: ConnectionId,
    address: SocketAddr,
    session: &'a mut SessionState,
    server: &'a ServerContext,
}

impl<'a> HandlerContext<'a> {
    pub(crate) fn new(
        id: ConnectionId,
        address: SocketAddr,
        session: &'a mut SessionState,
        server: &'a ServerContext,
    ) -> Self {
        Self {
            id,
            address,
            session,
            server,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn state(&self) -> PacketState {
        self.session.state
    }

    pub fn switch_state(&mut self, to: PacketState) {
        let from = self.session.state;
        self.session.state = to;
        self.server.log.state_switched(self.id, from, to);
    }

    /// Protocol version announced in the handshake, `0` before it.
    pub fn protocol_version(&self) -> i32 {
        self.session.protocol_version
    }

    pub fn set_protocol_version(&mut self, version: i32) {
        self.session.protocol_version = version;
    }

    /// Queues `packet` for the next write.
    pub fn send<P: PacketEncode>(&mut self, packet: &P) -> Result<(), ConnectionError> {
        self.session.out.write_packet(packet)?;
        Ok(())
    }

    /// Stops dispatching; queued output is still written before closing.
    pub fn close(&mut self) {
        self.session.closing = true;
    }

    /// Live connection count, read at call time.
    pub fn online(&self) -> usize {
        self.server.peers.online()
    }

    pub fn config(&self) -> &PandoraConfig {
        &self.server.config
    }

    pub fn log(&self) -> &dyn ProtocolLog {
        self.server.log.as_ref()
    }
}
