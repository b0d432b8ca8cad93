use net::{
    HandshakeC2s, LoginDisconnectS2c, LoginStartC2s, StatusPingC2s, StatusPongS2c,
    StatusRequestC2s, StatusResponseS2c,
};

use super::HandlerContext;
use crate::{
    error::ConnectionError,
    status::{PlayersInfo, StatusResponse, VersionInfo},
};

pub(super) fn handshake(
    ctx: &mut HandlerContext<'_>,
    packet: HandshakeC2s,
) -> Result<(), ConnectionError> {
    ctx.log().handshake(ctx.id(), &packet);
    ctx.set_protocol_version(packet.protocol_version);
    ctx.switch_state(packet.next_state.into());
    Ok(())
}

pub(super) fn status_request(
    ctx: &mut HandlerContext<'_>,
    _packet: StatusRequestC2s,
) -> Result<(), ConnectionError> {
    let config = ctx.config();
    let status = StatusResponse {
        version: VersionInfo {
            name: config.version_name.clone(),
            protocol: ctx.protocol_version(),
        },
        description: config.motd.clone(),
        players: PlayersInfo {
            max: config.max_players,
            online: i32::try_from(ctx.online()).unwrap_or(i32::MAX),
        },
    };

    let json = status.to_json()?;
    ctx.send(&StatusResponseS2c { json })
}

/// Echoes the payload and ends the exchange.
pub(super) fn status_ping(
    ctx: &mut HandlerContext<'_>,
    packet: StatusPingC2s,
) -> Result<(), ConnectionError> {
    ctx.send(&StatusPongS2c {
        payload: packet.payload,
    })?;
    ctx.close();
    Ok(())
}

// Login is not implemented past this point, so every login attempt is turned away.
pub(super) fn login_start(
    ctx: &mut HandlerContext<'_>,
    packet: LoginStartC2s,
) -> Result<(), ConnectionError> {
    ctx.log().login_refused(ctx.id(), &packet.username);
    let reason = serde_json::json!({ "text": ctx.config().login_message }).to_string();
    ctx.send(&LoginDisconnectS2c { reason })?;
    ctx.close();
    Ok(())
}
