//! Handshake and status front end for the Minecraft Java protocol.

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod packet;
pub mod server;
pub mod session;
pub mod status;

#[cfg(feature = "mimalloc")]
mod allocator {
    use mimalloc::MiMalloc;

    #[global_allocator]
    static GLOBAL: MiMalloc = MiMalloc;
}
