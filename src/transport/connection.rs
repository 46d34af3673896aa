//! # Connection Transport
//!
//! Wraps one duplex byte stream behind the rental discipline. The read half
//! is handed to the connection's receive loop once, at split time; the write
//! half stays here, reachable two ways:
//!
//! - [`Connection::send`]: a concurrent operation, for fire-and-forget
//!   frames such as broadcasts and server-side responses.
//! - [`Connection::rent`]: the exclusive rental, for the write leg of a
//!   request/response exchange that must not interleave with anything else.
//!
//! A request/response exchange must see only its own traffic on the stream,
//! not an interleaved fragment of a concurrent write from another caller on
//! the same connection; the gate enforces exactly that.

use crate::core::codec::PacketCodec;
use crate::core::wire::WireEncode;
use crate::error::Result;
use crate::protocol::packet::Packet;
use crate::transport::gate::{RentalGate, RentalPermit};
use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace};

/// The stream of inbound frames, consumed by exactly one receive loop.
pub type FrameSource<S> = FramedRead<ReadHalf<S>, PacketCodec>;

/// The guarded write side of one connection.
#[derive(Debug)]
pub struct Connection<S> {
    gate: RentalGate,
    writer: Mutex<FramedWrite<WriteHalf<S>, PacketCodec>>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite,
{
    /// Split a duplex stream into the guarded write side and the inbound
    /// frame source.
    pub fn split(stream: S) -> (Connection<S>, FrameSource<S>) {
        let (read_half, write_half) = tokio::io::split(stream);
        let connection = Connection {
            gate: RentalGate::new(),
            writer: Mutex::new(FramedWrite::new(write_half, PacketCodec::default())),
        };
        let frames = FramedRead::new(read_half, PacketCodec::default());
        (connection, frames)
    }

    /// Write one frame as a concurrent operation.
    ///
    /// Blocks while an exclusive rental is held; multiple operations may be
    /// in flight together (frame boundaries stay intact because each send
    /// holds the writer for one whole frame).
    pub async fn send(&self, packet: Packet) -> Result<()> {
        let _permit = self.gate.operation().await;
        trace!(kind = packet.kind(), bytes = packet.encoded_len(), "sending frame");
        let mut writer = self.writer.lock().await;
        writer.send(packet).await
    }

    /// Take sole use of the stream for one exchange.
    ///
    /// Blocks until every in-flight operation has completed and no other
    /// rental is held. Dropping the returned rental reopens the gate.
    pub async fn rent(&self) -> Rental<'_, S> {
        let permit = self.gate.rent().await;
        debug!("stream rented for exclusive exchange");
        Rental {
            connection: self,
            _permit: permit,
        }
    }
}

/// Sole use of the connection for one request/response exchange.
#[derive(Debug)]
pub struct Rental<'a, S> {
    connection: &'a Connection<S>,
    _permit: RentalPermit<'a>,
}

impl<S> Rental<'_, S>
where
    S: AsyncRead + AsyncWrite,
{
    /// Write one frame while holding the rental.
    pub async fn send(&mut self, packet: Packet) -> Result<()> {
        trace!(kind = packet.kind(), bytes = packet.encoded_len(), "sending rented frame");
        let mut writer = self.connection.writer.lock().await;
        writer.send(packet).await
    }
}
