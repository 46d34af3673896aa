//! # Packet Assembly
//!
//! The closed union over every frame the protocol can carry, with full-frame
//! encode and the discriminant-driven decode dispatch.
//!
//! Encoding builds the payload before the first byte reaches the
//! destination, so a failed serialization has no side effect. Decoding maps
//! the header's operation word onto the closed operation set for its role;
//! an unrecognized discriminant is a decode failure, never a silent default,
//! and a payload that does not consume its declared content region exactly
//! is rejected.

use crate::core::header::Header;
use crate::core::ident::Identifier;
use crate::core::wire::{expect_consumed, WireEncode};
use crate::error::{ProtocolError, Result};
use crate::protocol::broadcast::Broadcast;
use crate::protocol::kind::{compose, Event, Op};
use crate::protocol::request::{Credentials, Request, RequestBody};
use crate::protocol::response::Response;
use bytes::{Bytes, BytesMut};

/// One framed protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Request(Request),
    Response(Response),
    Broadcast(Broadcast),
}

impl Packet {
    /// The 4-byte discriminant this packet serializes under.
    pub fn kind(&self) -> u32 {
        match self {
            Packet::Request(request) => {
                compose(request.credentials.role(), request.op().word())
            }
            Packet::Response(response) => {
                compose(crate::protocol::kind::ROLE_RESPONSE, response.op.word())
            }
            Packet::Broadcast(broadcast) => {
                compose(crate::protocol::kind::ROLE_BROADCAST, broadcast.event().word())
            }
        }
    }

    /// The correlation token, for frames that participate in an exchange.
    pub fn correlation(&self) -> Option<Identifier> {
        match self {
            Packet::Request(request) => Some(request.correlation),
            Packet::Response(response) => Some(response.correlation),
            Packet::Broadcast(_) => None,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            Packet::Request(request) => request.body.encoded_len(),
            Packet::Response(response) => response.payload_len(),
            Packet::Broadcast(broadcast) => broadcast.encoded_len(),
        }
    }

    fn header(&self, content_size: u32) -> Header {
        match self {
            Packet::Request(request) => match &request.credentials {
                Credentials::Session {
                    user_id,
                    session_id,
                } => Header::RequestSession {
                    op: request.op().word(),
                    correlation: request.correlation,
                    user_id: *user_id,
                    session_id: *session_id,
                    content_size,
                },
                Credentials::Token {
                    user_id,
                    access_token,
                    refresh_token,
                } => Header::RequestToken {
                    op: request.op().word(),
                    correlation: request.correlation,
                    user_id: *user_id,
                    access_token: *access_token,
                    refresh_token: *refresh_token,
                    content_size,
                },
            },
            Packet::Response(response) => Header::Response {
                op: response.op.word(),
                correlation: response.correlation,
                error_code: response.status.value(),
                content_size,
            },
            Packet::Broadcast(broadcast) => Header::Broadcast {
                op: broadcast.event().word(),
                content_size,
            },
        }
    }

    fn encode_payload(&self, dst: &mut BytesMut) -> Result<()> {
        match self {
            Packet::Request(request) => request.body.encode(dst),
            Packet::Response(response) => response.encode_payload(dst),
            Packet::Broadcast(broadcast) => broadcast.encode(dst),
        }
    }

    /// Assemble a packet from a decoded header and its exact payload region.
    pub fn from_frame(header: Header, mut payload: Bytes) -> Result<Packet> {
        let kind = header.kind();
        let packet = match header {
            Header::RequestSession {
                op,
                correlation,
                user_id,
                session_id,
                ..
            } => {
                let op = Op::from_word(op).ok_or(ProtocolError::UnknownPacketType(kind))?;
                if op == Op::RefreshSession {
                    // token refresh only makes sense with token credentials
                    return Err(ProtocolError::RoleMismatch {
                        kind,
                        role: "guid-credential request",
                    });
                }
                Packet::Request(Request {
                    correlation,
                    credentials: Credentials::Session {
                        user_id,
                        session_id,
                    },
                    body: RequestBody::decode_for(op, &mut payload)?,
                })
            }
            Header::RequestToken {
                op,
                correlation,
                user_id,
                access_token,
                refresh_token,
                ..
            } => {
                let op = Op::from_word(op).ok_or(ProtocolError::UnknownPacketType(kind))?;
                Packet::Request(Request {
                    correlation,
                    credentials: Credentials::Token {
                        user_id,
                        access_token,
                        refresh_token,
                    },
                    body: RequestBody::decode_for(op, &mut payload)?,
                })
            }
            Header::Response {
                op,
                correlation,
                error_code,
                ..
            } => {
                let op = Op::from_word(op).ok_or(ProtocolError::UnknownPacketType(kind))?;
                let status = crate::protocol::kind::ErrorCode::from_value(error_code)?;
                Packet::Response(Response::decode_payload(
                    correlation,
                    op,
                    status,
                    &mut payload,
                )?)
            }
            Header::Broadcast { op, .. } => {
                let event = Event::from_word(op).ok_or(ProtocolError::UnknownPacketType(kind))?;
                Packet::Broadcast(Broadcast::decode_for(event, &mut payload)?)
            }
        };

        expect_consumed(&payload)?;
        Ok(packet)
    }

    /// Decode one complete frame from a contiguous buffer.
    pub fn from_bytes(frame: &[u8]) -> Result<Packet> {
        let mut src = Bytes::copy_from_slice(frame);
        let header = Header::decode(&mut src)?;
        let declared = header.content_size();
        if src.len() < declared {
            return Err(ProtocolError::Truncated {
                needed: declared,
                available: src.len(),
            });
        }
        if src.len() > declared {
            return Err(ProtocolError::TrailingBytes(src.len() - declared));
        }
        Packet::from_frame(header, src)
    }
}

impl WireEncode for Packet {
    fn encoded_len(&self) -> usize {
        self.header(0).encoded_len() + self.payload_len()
    }

    /// Serialize the full frame. The payload is assembled and validated
    /// before any byte lands in `dst`, so a failure leaves `dst` untouched.
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let mut payload = BytesMut::with_capacity(self.payload_len());
        self.encode_payload(&mut payload)?;

        let content_size = u32::try_from(payload.len())
            .map_err(|_| ProtocolError::OversizedContent(payload.len()))?;
        let header = self.header(content_size);

        let mut scratch = BytesMut::with_capacity(header.encoded_len());
        header.encode(&mut scratch)?;

        dst.extend_from_slice(&scratch);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ident::{Guid, Token};
    use crate::protocol::kind::{ErrorCode, ROLE_REQUEST_SESSION};

    fn sample_request() -> Packet {
        Packet::Request(Request {
            correlation: Identifier::from_parts(50, 1, 2),
            credentials: Credentials::Session {
                user_id: Guid::from_bytes([0x01; 16]),
                session_id: Guid::from_bytes([0x02; 16]),
            },
            body: RequestBody::MessagePost {
                room: Identifier::from_parts(60, 0, 0),
                body: String::from("hello"),
            },
        })
    }

    #[test]
    fn request_frame_roundtrip() {
        let packet = sample_request();
        let bytes = packet.to_wire_bytes().unwrap();
        assert_eq!(bytes.len(), packet.encoded_len());
        assert_eq!(Packet::from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn token_request_frame_roundtrip() {
        let packet = Packet::Request(Request {
            correlation: Identifier::from_parts(51, 1, 2),
            credentials: Credentials::Token {
                user_id: Identifier::from_parts(52, 0, 0),
                access_token: Token::from_bytes([0x0A; 16]),
                refresh_token: Token::from_bytes([0x0B; 16]),
            },
            body: RequestBody::RefreshSession,
        });
        let bytes = packet.to_wire_bytes().unwrap();
        assert_eq!(Packet::from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn refresh_with_guid_credentials_is_a_role_mismatch() {
        let packet = Packet::Request(Request {
            correlation: Identifier::MIN,
            credentials: Credentials::Session {
                user_id: Guid::NIL,
                session_id: Guid::NIL,
            },
            body: RequestBody::RefreshSession,
        });
        // encoding succeeds mechanically; the decoder rejects the combination
        let bytes = packet.to_wire_bytes().unwrap();
        assert!(matches!(
            Packet::from_bytes(&bytes),
            Err(ProtocolError::RoleMismatch { .. })
        ));
    }

    #[test]
    fn unknown_operation_word_rejected() {
        let mut bytes = BytesMut::new();
        Header::RequestSession {
            op: 0x00EE,
            correlation: Identifier::MIN,
            user_id: Guid::NIL,
            session_id: Guid::NIL,
            content_size: 0,
        }
        .encode(&mut bytes)
        .unwrap();
        let err = Packet::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnknownPacketType(kind) if kind == compose(ROLE_REQUEST_SESSION, 0x00EE)
        ));
    }

    #[test]
    fn error_response_roundtrips_without_body() {
        let packet = Packet::Response(Response::error(
            Identifier::from_parts(70, 0, 0),
            Op::JoinRoom,
            ErrorCode::UnknownRoom,
        ));
        let bytes = packet.to_wire_bytes().unwrap();
        // header only: no payload follows the error code
        assert_eq!(bytes.len(), crate::core::header::RESPONSE_SIZE);

        match Packet::from_bytes(&bytes).unwrap() {
            Packet::Response(response) => {
                assert_eq!(response.status, ErrorCode::UnknownRoom);
                assert_eq!(response.body, None);
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn error_response_with_content_is_rejected() {
        let mut bytes = BytesMut::new();
        Header::Response {
            op: Op::Login.word(),
            correlation: Identifier::MIN,
            error_code: ErrorCode::InvalidCredentials.value(),
            content_size: 3,
        }
        .encode(&mut bytes)
        .unwrap();
        bytes.extend_from_slice(&[1, 2, 3]);

        assert!(matches!(
            Packet::from_bytes(&bytes),
            Err(ProtocolError::TrailingBytes(3))
        ));
    }

    #[test]
    fn failed_encode_leaves_destination_untouched() {
        let packet = Packet::Response(Response {
            correlation: Identifier::MIN,
            op: Op::Login,
            status: ErrorCode::Success,
            body: None, // invalid: success must carry a body
        });
        let mut dst = BytesMut::new();
        dst.extend_from_slice(b"prefix");
        assert!(packet.encode(&mut dst).is_err());
        assert_eq!(&dst[..], b"prefix");
    }

    #[test]
    fn truncated_payload_rejected() {
        let bytes = sample_request().to_wire_bytes().unwrap();
        assert!(matches!(
            Packet::from_bytes(&bytes[..bytes.len() - 1]),
            Err(ProtocolError::Truncated { .. })
        ));
    }
}
