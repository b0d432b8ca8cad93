use std::time::Duration;

use bytes::BytesMut;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    sync::broadcast,
    time::timeout,
};

use crate::{
    error::ConnectionError,
    session::{Flow, Session},
};

const MAX_CHUNK_SIZE: usize = 1024;

/// Drives one client socket through its [`Session`].
pub struct Connection {
    session: Session,
    read: OwnedReadHalf,
    write: OwnedWriteHalf,
    read_timeout: Option<Duration>,
}

impl Connection {
    pub fn new(stream: TcpStream, session: Session, read_timeout: Option<Duration>) -> Self {
        let (read, write) = stream.into_split();
        Self {
            session,
            read,
            write,
            read_timeout,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reads until EOF, a fatal error, the session asking to close, or `stop`.
    pub async fn run(mut self, mut stop: broadcast::Receiver<()>) -> Result<(), ConnectionError> {
        let mut buf = BytesMut::with_capacity(MAX_CHUNK_SIZE);
        loop {
            buf.clear();
            let bytes_read = tokio::select! {
                res = self.read_chunk(&mut buf) => res?,
                _ = stop.recv() => return Ok(()),
            };
            if bytes_read == 0 {
                return Ok(());
            }

            let flow = self.session.receive(&buf)?;
            self.flush().await?;
            if flow == Flow::Close {
                self.write.shutdown().await?;
                return Ok(());
            }
        }
    }

    async fn read_chunk(&mut self, buf: &mut BytesMut) -> Result<usize, ConnectionError> {
        let read = self.read.read_buf(buf);
        let bytes_read = match self.read_timeout {
            Some(limit) => timeout(limit, read).await??,
            None => read.await?,
        };
        Ok(bytes_read)
    }

    async fn flush(&mut self) -> Result<(), ConnectionError> {
        let bytes = self.session.take_outbound();
        if bytes.is_empty() {
            return Ok(());
        }
        self.write.write_all(&bytes).await?;
        self.write.flush().await?;
        Ok(())
    }
}
