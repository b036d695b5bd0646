//! The transport collaborator used to deliver [`MessagePacket`]s between the
//! two parties.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::{
        Mutex,
        mpsc::{Receiver, Sender, channel, error::SendError},
    },
    time::timeout,
};

use crate::packet::{MessagePacket, PacketHeader};

/// Delivers packets to the peer and blocks for packets matching a header.
///
/// Implementations may multiplex many tasks over one connection; `receive` must
/// match on the *full* header, buffering packets that arrive out of order.
/// Timeouts and cancellation, if desired, are the transport's responsibility;
/// the protocol core blocks indefinitely on a hung peer.
pub trait Transport {
    /// The error that can occur sending packets to the peer.
    type SendError: fmt::Debug;
    /// The error that can occur receiving packets from the peer.
    type RecvError: fmt::Debug;

    /// Sends a packet to the peer.
    fn send(
        &mut self,
        packet: MessagePacket,
    ) -> impl Future<Output = Result<(), Self::SendError>> + Send;

    /// Blocks until the packet matching `template` exactly has arrived.
    fn receive(
        &mut self,
        template: &PacketHeader,
    ) -> impl Future<Output = Result<MessagePacket, Self::RecvError>> + Send;

    /// Establishes the connection to the peer.
    fn connect(&mut self) -> impl Future<Output = Result<(), Self::SendError>> + Send;

    /// Tears the connection down.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), Self::SendError>> + Send;

    /// The total number of payload bytes sent so far. Benchmarking only.
    fn bytes_sent(&self) -> u64;

    /// The total number of payload bytes received so far. Benchmarking only.
    fn bytes_received(&self) -> u64;
}

/// The error raised by `send` calls of an [`InMemoryTransport`].
#[derive(Debug)]
pub enum InMemorySendError {
    /// The peer endpoint has been dropped.
    Closed,
    /// The packet could not be serialized.
    Serde(String),
}

/// The error raised by `receive` calls of an [`InMemoryTransport`].
#[derive(Debug)]
pub enum InMemoryRecvError {
    /// The peer endpoint has been dropped.
    Closed,
    /// No matching packet was received before the timeout.
    TimeoutElapsed,
    /// A received frame could not be deserialized.
    Serde(String),
}

/// An in-process transport built from a pair of bounded mpsc channels.
///
/// Frames are bincode-serialized packets. Packets whose header does not match
/// the current `receive` template are parked in a pending map and handed out
/// when a later `receive` asks for them, so interleaved tasks are paired
/// correctly regardless of arrival order.
///
/// An endpoint is a cloneable handle: clones share the underlying connection,
/// the pending map and the byte counters, so protocol instances with distinct
/// task ids can multiplex one transport by each owning a clone. A handle that
/// receives a packet destined for another task parks it; the other handle
/// picks it up from the pending map on its next `receive`.
#[derive(Debug, Clone)]
pub struct InMemoryTransport {
    s: Sender<Vec<u8>>,
    r: Arc<Mutex<Receiver<Vec<u8>>>>,
    pending: Arc<Mutex<HashMap<PacketHeader, MessagePacket>>>,
    sent: Arc<AtomicU64>,
    received: Arc<AtomicU64>,
}

impl InMemoryTransport {
    const BUFFER_CAPACITY: usize = 1024;
    const RECV_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates the two connected endpoints of one transport.
    pub fn pair() -> (InMemoryTransport, InMemoryTransport) {
        let (send_a_to_b, recv_a_to_b) = channel(Self::BUFFER_CAPACITY);
        let (send_b_to_a, recv_b_to_a) = channel(Self::BUFFER_CAPACITY);
        let a = InMemoryTransport::endpoint(send_a_to_b, recv_b_to_a);
        let b = InMemoryTransport::endpoint(send_b_to_a, recv_a_to_b);
        (a, b)
    }

    fn endpoint(s: Sender<Vec<u8>>, r: Receiver<Vec<u8>>) -> InMemoryTransport {
        InMemoryTransport {
            s,
            r: Arc::new(Mutex::new(r)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            sent: Arc::new(AtomicU64::new(0)),
            received: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Transport for InMemoryTransport {
    type SendError = InMemorySendError;
    type RecvError = InMemoryRecvError;

    async fn send(&mut self, packet: MessagePacket) -> Result<(), InMemorySendError> {
        let frame =
            bincode::serialize(&packet).map_err(|e| InMemorySendError::Serde(format!("{e:?}")))?;
        self.sent.fetch_add(frame.len() as u64, Ordering::Relaxed);
        self.s
            .send(frame)
            .await
            .map_err(|SendError(_)| InMemorySendError::Closed)
    }

    async fn receive(&mut self, template: &PacketHeader) -> Result<MessagePacket, InMemoryRecvError> {
        loop {
            if let Some(packet) = self.pending.lock().await.remove(template) {
                return Ok(packet);
            }
            let mut r = self.r.lock().await;
            // another handle may have parked our packet while we waited
            if let Some(packet) = self.pending.lock().await.remove(template) {
                return Ok(packet);
            }
            let frame = match timeout(Self::RECV_TIMEOUT, r.recv()).await {
                Ok(Some(frame)) => frame,
                Ok(None) => return Err(InMemoryRecvError::Closed),
                Err(_) => return Err(InMemoryRecvError::TimeoutElapsed),
            };
            drop(r);
            self.received.fetch_add(frame.len() as u64, Ordering::Relaxed);
            let packet: MessagePacket = bincode::deserialize(&frame)
                .map_err(|e| InMemoryRecvError::Serde(format!("{e:?}")))?;
            if packet.header == *template {
                return Ok(packet);
            }
            self.pending.lock().await.insert(packet.header, packet);
        }
    }

    async fn connect(&mut self) -> Result<(), InMemorySendError> {
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), InMemorySendError> {
        Ok(())
    }

    fn bytes_sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    fn bytes_received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}
