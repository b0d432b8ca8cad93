use std::{fmt::Display, net::SocketAddr, time::Duration};

use log::{debug, error, info, warn};
use net::{HandshakeC2s, PacketState};

use crate::connection::ConnectionId;

/// Logging capability handed to each component at construction.
///
/// One method per event so call sites stay free of formatting and tests can
/// record what was reported without touching the global logger.
pub trait ProtocolLog: Send + Sync {
    fn listening(&self, address: &SocketAddr);
    fn new_connection(&self, id: ConnectionId, address: &SocketAddr);
    fn connection_rejected(&self, address: &SocketAddr);
    fn accept_failed(&self, err: &std::io::Error);
    fn tcp_nodelay_failed(&self, err: &std::io::Error);
    fn handshake(&self, id: ConnectionId, handshake: &HandshakeC2s);
    fn state_switched(&self, id: ConnectionId, from: PacketState, to: PacketState);
    fn unknown_packet(&self, id: ConnectionId, state: PacketState, packet_id: i32);
    fn login_refused(&self, id: ConnectionId, username: &str);
    fn protocol_violation(&self, id: ConnectionId, address: &SocketAddr, err: &dyn Display);
    fn connection_closed(&self, id: ConnectionId, address: &SocketAddr, lifetime: Duration);
    fn connection_error(&self, id: ConnectionId, address: &SocketAddr, err: &dyn Display);
}

/// [`ProtocolLog`] backed by the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct PandoraLogger;

impl ProtocolLog for PandoraLogger {
    fn listening(&self, address: &SocketAddr) {
        info!("Server started on {address}");
    }

    fn new_connection(&self, id: ConnectionId, address: &SocketAddr) {
        info!("New connection #{id} from {address}");
    }

    fn connection_rejected(&self, address: &SocketAddr) {
        warn!("Connection limit reached, rejecting {address}");
    }

    fn accept_failed(&self, err: &std::io::Error) {
        error!("Error accepting connection: {err}");
    }

    fn tcp_nodelay_failed(&self, err: &std::io::Error) {
        error!("Failed to set TCP_NODELAY: {err}");
    }

    fn handshake(&self, id: ConnectionId, handshake: &HandshakeC2s) {
        debug!(
            "#{id} handshake: protocol {} via {}:{} -> {:?}",
            handshake.protocol_version,
            handshake.server_address,
            handshake.server_port,
            handshake.next_state
        );
    }

    fn state_switched(&self, id: ConnectionId, from: PacketState, to: PacketState) {
        debug!("#{id} state {from} -> {to}");
    }

    fn unknown_packet(&self, id: ConnectionId, state: PacketState, packet_id: i32) {
        warn!("#{id} skipped unknown packet {packet_id:#04x} in state {state}");
    }

    fn login_refused(&self, id: ConnectionId, username: &str) {
        info!("#{id} login attempt as '{username}' refused");
    }

    fn protocol_violation(&self, id: ConnectionId, address: &SocketAddr, err: &dyn Display) {
        warn!("Closing #{id} ({address}): {err}");
    }

    fn connection_closed(&self, id: ConnectionId, address: &SocketAddr, lifetime: Duration) {
        debug!("Connection #{id} ({address}) closed after {lifetime:?}");
    }

    fn connection_error(&self, id: ConnectionId, address: &SocketAddr, err: &dyn Display) {
        debug!("Connection #{id} ({address}) error: {err}");
    }
}
