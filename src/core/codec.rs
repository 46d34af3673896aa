//! # Stream Codec
//!
//! Frames packets over a byte stream for use with `tokio_util`'s `Framed`
//! machinery. Decoding is a two-state machine: buffer the header (whose
//! length follows from the role word), then buffer exactly the declared
//! content and hand the pair to packet assembly.
//!
//! The signature is checked as soon as two bytes are available, so a stream
//! that is not speaking this protocol is rejected before any length field is
//! trusted. The content-size bound in the header decoder caps how much a
//! frame can make the decoder buffer.

use crate::config::SIGNATURE;
use crate::core::header::{self, Header};
use crate::error::{ProtocolError, Result};
use crate::protocol::kind::split;
use crate::protocol::packet::Packet;
use crate::core::wire::WireEncode;
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Codec for framing [`Packet`]s over any byte stream.
#[derive(Debug, Default)]
pub struct PacketCodec {
    state: DecodeState,
}

#[derive(Debug, Default)]
enum DecodeState {
    #[default]
    Header,
    Payload(Header),
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Packet>> {
        loop {
            match &self.state {
                DecodeState::Header => {
                    if buf.len() < 2 {
                        return Ok(None);
                    }
                    let signature = u16::from_be_bytes([buf[0], buf[1]]);
                    if signature != SIGNATURE {
                        return Err(ProtocolError::BadSignature { found: signature });
                    }
                    if buf.len() < header::BASE_SIZE {
                        return Ok(None);
                    }

                    let kind = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]);
                    let (role, _) = split(kind);
                    let header_len = Header::size_for_role(role)
                        .ok_or(ProtocolError::UnknownPacketType(kind))?;
                    if buf.len() < header_len {
                        buf.reserve(header_len - buf.len());
                        return Ok(None);
                    }

                    let mut raw = buf.split_to(header_len).freeze();
                    let parsed = Header::decode(&mut raw)?;
                    self.state = DecodeState::Payload(parsed);
                }
                DecodeState::Payload(parsed) => {
                    let content_size = parsed.content_size();
                    if buf.len() < content_size {
                        buf.reserve(content_size - buf.len());
                        return Ok(None);
                    }

                    let payload = buf.split_to(content_size).freeze();
                    let DecodeState::Payload(parsed) =
                        std::mem::take(&mut self.state)
                    else {
                        unreachable!("state checked above");
                    };
                    return Packet::from_frame(parsed, payload).map(Some);
                }
            }
        }
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<()> {
        // Packet::encode assembles and validates before touching dst.
        packet.encode(dst)
    }
}
