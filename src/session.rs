//! Per-connection protocol state machine.
//!
//! A [`Session`] never touches a socket: the connection driver hands it
//! whatever bytes arrived and writes out whatever it queued. That keeps the
//! handshake and status logic testable with plain byte slices.

use std::{net::SocketAddr, sync::Arc};

use net::{PacketDecoder, PacketEncoder, PacketState};

use crate::{
    config::PandoraConfig,
    connection::{ConnectionId, PeerCount},
    error::ConnectionError,
    logging::ProtocolLog,
    packet::{HandlerContext, PacketRegistry},
};

/// Services shared by every session of a server.
#[derive(Clone)]
pub struct ServerContext {
    pub config: Arc<PandoraConfig>,
    pub packets: Arc<PacketRegistry>,
    pub peers: Arc<dyn PeerCount>,
    pub log: Arc<dyn ProtocolLog>,
}

/// Whether the driver should keep reading after a `receive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Mutable per-connection state visible to handlers.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) state: PacketState,
    pub(crate) protocol_version: i32,
    pub(crate) out: PacketEncoder,
    pub(crate) closing: bool,
}

pub struct Session {
    id: ConnectionId,
    address: SocketAddr,
    decoder: PacketDecoder,
    inner: SessionState,
    server: ServerContext,
}

impl Session {
    pub fn new(id: ConnectionId, address: SocketAddr, server: ServerContext) -> Self {
        Self {
            id,
            address,
            decoder: PacketDecoder::with_limit(server.config.max_frame_size),
            inner: SessionState {
                state: PacketState::Handshaking,
                protocol_version: 0,
                out: PacketEncoder::new(),
                closing: false,
            },
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
        self.inner.state
    }

    pub fn protocol_version(&self) -> i32 {
        self.inner.protocol_version
    }

    /// Feeds freshly read bytes and dispatches every complete frame in order.
    ///
    /// Unknown packets outside the handshake are logged and skipped. Any other
    /// error is fatal: the caller must drop the connection without reading on.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<Flow, ConnectionError> {
        self.decoder.queue_slice(bytes);

        while !self.inner.closing {
            let Some(frame) = self.decoder.try_next_packet()? else {
                break;
            };

            let state = self.inner.state;
            let mut ctx = HandlerContext::new(self.id, self.address, &mut self.inner, &self.server);
            match self.server.packets.dispatch(state, &frame, &mut ctx) {
                Ok(()) => {}
                Err(err) if err.is_recoverable() => {
                    self.server.log.unknown_packet(self.id, state, frame.id);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(if self.inner.closing {
            Flow::Close
        } else {
            Flow::Continue
        })
    }

    /// Drains encoded outbound frames.
    pub fn take_outbound(&mut self) -> Vec<u8> {
        self.inner.out.take()
    }
}
