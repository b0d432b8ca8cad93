use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{net::TcpListener, sync::broadcast, time::sleep};

use crate::{
    config::PandoraConfig, connection::ConnectionManager, logging::ProtocolLog,
    packet::PacketRegistry,
};

/// Accept loop in front of a [`ConnectionManager`].
pub struct Server {
    listener: TcpListener,
    manager: Arc<ConnectionManager>,
    log: Arc<dyn ProtocolLog>,
}

impl Server {
    /// Binds `config.bind` with the vanilla packet table.
    pub async fn bind(config: PandoraConfig, log: Arc<dyn ProtocolLog>) -> anyhow::Result<Self> {
        let packets = PacketRegistry::vanilla()?;
        Self::bind_with(config, packets, log).await
    }

    pub async fn bind_with(
        config: PandoraConfig,
        packets: PacketRegistry,
        log: Arc<dyn ProtocolLog>,
    ) -> anyhow::Result<Self> {
        let address = config.bind_addr()?;
        let listener = TcpListener::bind(address).await?;
        let manager = ConnectionManager::new(Arc::new(config), Arc::new(packets), log.clone());
        Ok(Self {
            listener,
            manager,
            log,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Serves until `stop` fires, then signals every open connection to finish.
    pub async fn run(self, mut stop: broadcast::Receiver<()>) -> anyhow::Result<()> {
        self.log.listening(&self.local_addr()?);

        loop {
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = stop.recv() => break,
            };

            let (stream, address) = match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    // Usually fd exhaustion; back off instead of spinning.
                    self.log.accept_failed(&err);
                    sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };

            if dotenvy::var("PANDORA_NO_NODELAY").is_err() {
                if let Err(err) = stream.set_nodelay(true) {
                    self.log.tcp_nodelay_failed(&err);
                }
            }

            if self.manager.accept(stream, address).is_err() {
                self.log.connection_rejected(&address);
            }
        }

        self.manager.shutdown();
        Ok(())
    }
}
