//! Live connection tracking.
//!
//! Every accepted socket gets an id, an entry in the registry and its own
//! task. The entry is removed by a guard owned by that task, so it goes away
//! no matter how the task ends.

#[allow(clippy::module_inception)]
mod connection;

use std::{
    collections::HashMap,
    fmt,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};

use tokio::{
    net::TcpStream,
    sync::{broadcast, OwnedSemaphorePermit, Semaphore},
};

pub use self::connection::Connection;
use crate::{
    config::PandoraConfig,
    error::AcceptError,
    logging::ProtocolLog,
    packet::PacketRegistry,
    session::{ServerContext, Session},
};

/// Identifier handed out at accept time, unique for the manager's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Source of the "players online" figure reported in status responses.
pub trait PeerCount: Send + Sync {
    fn online(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub address: SocketAddr,
    pub connected_at: Instant,
}

impl ConnectionHandle {
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

pub struct ConnectionManager {
    connections: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
    next_id: AtomicU64,
    config: Arc<PandoraConfig>,
    packets: Arc<PacketRegistry>,
    log: Arc<dyn ProtocolLog>,
    stop: broadcast::Sender<()>,
    permits: Arc<Semaphore>,
    max_connections: usize,
}

impl ConnectionManager {
    pub fn new(
        config: Arc<PandoraConfig>,
        packets: Arc<PacketRegistry>,
        log: Arc<dyn ProtocolLog>,
    ) -> Arc<Self> {
        let max_connections = config.max_connections as usize;
        let (stop, _) = broadcast::channel(1);
        Arc::new(Self {
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config,
            packets,
            log,
            stop,
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        })
    }

    /// Registers `stream` and spawns the task that serves it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn accept(
        self: &Arc<Self>,
        stream: TcpStream,
        address: SocketAddr,
    ) -> Result<ConnectionHandle, AcceptError> {
        let permit = self
            .permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| AcceptError::LimitReached(self.max_connections))?;

        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = ConnectionHandle {
            id,
            address,
            connected_at: Instant::now(),
        };
        self.lock().insert(id, handle.clone());
        self.log.new_connection(id, &address);

        let guard = Registration {
            manager: self.clone(),
            id,
            _permit: permit,
        };
        let server = ServerContext {
            config: self.config.clone(),
            packets: self.packets.clone(),
            peers: self.clone(),
            log: self.log.clone(),
        };
        let connection = Connection::new(
            stream,
            Session::new(id, address, server),
            self.config.read_timeout(),
        );
        let stop = self.stop.subscribe();
        let log = self.log.clone();
        let connected_at = handle.connected_at;

        tokio::spawn(async move {
            let _guard = guard;
            match connection.run(stop).await {
                Ok(()) => log.connection_closed(id, &address, connected_at.elapsed()),
                Err(err) if err.is_protocol_violation() => {
                    log.protocol_violation(id, &address, &err)
                }
                Err(err) => log.connection_error(id, &address, &err),
            }
        });

        Ok(handle)
    }

    /// Drops the registry entry for `id`. Removing an unknown id is a no-op.
    pub fn remove(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        self.lock().remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        self.lock().get(&id).cloned()
    }

    /// Live connection count, read under the registry lock.
    pub fn snapshot(&self) -> usize {
        self.lock().len()
    }

    /// Copy of the registry ordered by id.
    pub fn connections(&self) -> Vec<ConnectionHandle> {
        let mut handles: Vec<_> = self.lock().values().cloned().collect();
        handles.sort_by_key(|handle| handle.id);
        handles
    }

    /// Tells every connection task to stop reading and finish.
    pub fn shutdown(&self) {
        let _ = self.stop.send(());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, ConnectionHandle>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PeerCount for ConnectionManager {
    fn online(&self) -> usize {
        self.snapshot()
    }
}

/// Owned by a connection task; unregisters the connection when dropped.
struct Registration {
    manager: Arc<ConnectionManager>,
    id: ConnectionId,
    _permit: OwnedSemaphorePermit,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.manager.remove(self.id);
    }
}
