//! # Request Packets
//!
//! A request carries caller credentials plus one operation body, and expects
//! exactly one response correlated by the request's correlation id.
//!
//! Credentials come in the protocol's two generations: guid-based session
//! credentials, and identifier-plus-token credentials. The generation is part
//! of the discriminant's role word, so the decoder never has to guess from
//! header length.

use crate::core::ident::{Guid, Identifier, Token};
use crate::core::wire::{get_ident, get_string, put_ident, put_string, string_len};
use crate::error::{ProtocolError, Result};
use crate::protocol::kind::{Op, ROLE_REQUEST_SESSION, ROLE_REQUEST_TOKEN};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Caller identity attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// First generation: principal and session are 16-byte guids.
    Session { user_id: Guid, session_id: Guid },
    /// Second generation: principal is a 10-byte identifier; access and
    /// refresh tokens are opaque 16-byte values.
    Token {
        user_id: Identifier,
        access_token: Token,
        refresh_token: Token,
    },
}

impl Credentials {
    /// The role word this credential generation serializes under.
    pub fn role(&self) -> u16 {
        match self {
            Credentials::Session { .. } => ROLE_REQUEST_SESSION,
            Credentials::Token { .. } => ROLE_REQUEST_TOKEN,
        }
    }
}

/// One request frame: correlation id, credentials, operation body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub correlation: Identifier,
    pub credentials: Credentials,
    pub body: RequestBody,
}

impl Request {
    /// The operation this request performs.
    pub fn op(&self) -> Op {
        self.body.op()
    }
}

/// Operation-specific request payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Login {
        username: String,
        password: String,
    },
    Logout,
    Register {
        username: String,
        password: String,
        display_name: String,
    },
    FetchMessages {
        room: Identifier,
        /// Page cursor: only messages strictly older than this id are
        /// returned. Absent means "from the newest".
        before: Option<Identifier>,
        limit: u32,
    },
    FetchUsers {
        room: Identifier,
    },
    MessagePost {
        room: Identifier,
        body: String,
    },
    RoomCreate {
        name: String,
    },
    RoomDelete {
        room: Identifier,
    },
    JoinRoom {
        room: Identifier,
    },
    LeaveRoom {
        room: Identifier,
    },
    KickUser {
        room: Identifier,
        user: Identifier,
    },
    FetchRooms,
    RefreshSession,
}

impl RequestBody {
    /// The operation word this body serializes under.
    pub fn op(&self) -> Op {
        match self {
            RequestBody::Login { .. } => Op::Login,
            RequestBody::Logout => Op::Logout,
            RequestBody::Register { .. } => Op::Register,
            RequestBody::FetchMessages { .. } => Op::FetchMessages,
            RequestBody::FetchUsers { .. } => Op::FetchUsers,
            RequestBody::MessagePost { .. } => Op::MessagePost,
            RequestBody::RoomCreate { .. } => Op::RoomCreate,
            RequestBody::RoomDelete { .. } => Op::RoomDelete,
            RequestBody::JoinRoom { .. } => Op::JoinRoom,
            RequestBody::LeaveRoom { .. } => Op::LeaveRoom,
            RequestBody::KickUser { .. } => Op::KickUser,
            RequestBody::FetchRooms => Op::FetchRooms,
            RequestBody::RefreshSession => Op::RefreshSession,
        }
    }

    /// Exact payload length in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            RequestBody::Login { username, password } => string_len(username) + string_len(password),
            RequestBody::Logout => 0,
            RequestBody::Register {
                username,
                password,
                display_name,
            } => string_len(username) + string_len(password) + string_len(display_name),
            RequestBody::FetchMessages { before, .. } => {
                // presence byte + optional cursor + limit
                1 + before.map_or(0, |_| Identifier::SIZE) + Identifier::SIZE + 4
            }
            RequestBody::FetchUsers { .. } => Identifier::SIZE,
            RequestBody::MessagePost { body, .. } => Identifier::SIZE + string_len(body),
            RequestBody::RoomCreate { name } => string_len(name),
            RequestBody::RoomDelete { .. } => Identifier::SIZE,
            RequestBody::JoinRoom { .. } => Identifier::SIZE,
            RequestBody::LeaveRoom { .. } => Identifier::SIZE,
            RequestBody::KickUser { .. } => Identifier::SIZE * 2,
            RequestBody::FetchRooms => 0,
            RequestBody::RefreshSession => 0,
        }
    }

    /// Append the payload bytes to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        match self {
            RequestBody::Login { username, password } => {
                put_string(dst, username)?;
                put_string(dst, password)
            }
            RequestBody::Logout | RequestBody::FetchRooms | RequestBody::RefreshSession => Ok(()),
            RequestBody::Register {
                username,
                password,
                display_name,
            } => {
                put_string(dst, username)?;
                put_string(dst, password)?;
                put_string(dst, display_name)
            }
            RequestBody::FetchMessages {
                room,
                before,
                limit,
            } => {
                put_ident(dst, room);
                match before {
                    Some(cursor) => {
                        dst.put_u8(1);
                        put_ident(dst, cursor);
                    }
                    None => dst.put_u8(0),
                }
                dst.put_u32(*limit);
                Ok(())
            }
            RequestBody::FetchUsers { room }
            | RequestBody::RoomDelete { room }
            | RequestBody::JoinRoom { room }
            | RequestBody::LeaveRoom { room } => {
                put_ident(dst, room);
                Ok(())
            }
            RequestBody::MessagePost { room, body } => {
                put_ident(dst, room);
                put_string(dst, body)
            }
            RequestBody::RoomCreate { name } => put_string(dst, name),
            RequestBody::KickUser { room, user } => {
                put_ident(dst, room);
                put_ident(dst, user);
                Ok(())
            }
        }
    }

    /// Decode the payload for a known operation.
    pub fn decode_for(op: Op, src: &mut Bytes) -> Result<Self> {
        match op {
            Op::Login => Ok(RequestBody::Login {
                username: get_string(src)?,
                password: get_string(src)?,
            }),
            Op::Logout => Ok(RequestBody::Logout),
            Op::Register => Ok(RequestBody::Register {
                username: get_string(src)?,
                password: get_string(src)?,
                display_name: get_string(src)?,
            }),
            Op::FetchMessages => {
                let room = get_ident(src)?;
                if !src.has_remaining() {
                    return Err(ProtocolError::Truncated {
                        needed: 1,
                        available: 0,
                    });
                }
                let before = match src.get_u8() {
                    0 => None,
                    _ => Some(get_ident(src)?),
                };
                if src.remaining() < 4 {
                    return Err(ProtocolError::Truncated {
                        needed: 4,
                        available: src.remaining(),
                    });
                }
                Ok(RequestBody::FetchMessages {
                    room,
                    before,
                    limit: src.get_u32(),
                })
            }
            Op::FetchUsers => Ok(RequestBody::FetchUsers {
                room: get_ident(src)?,
            }),
            Op::MessagePost => Ok(RequestBody::MessagePost {
                room: get_ident(src)?,
                body: get_string(src)?,
            }),
            Op::RoomCreate => Ok(RequestBody::RoomCreate {
                name: get_string(src)?,
            }),
            Op::RoomDelete => Ok(RequestBody::RoomDelete {
                room: get_ident(src)?,
            }),
            Op::JoinRoom => Ok(RequestBody::JoinRoom {
                room: get_ident(src)?,
            }),
            Op::LeaveRoom => Ok(RequestBody::LeaveRoom {
                room: get_ident(src)?,
            }),
            Op::KickUser => Ok(RequestBody::KickUser {
                room: get_ident(src)?,
                user: get_ident(src)?,
            }),
            Op::FetchRooms => Ok(RequestBody::FetchRooms),
            Op::RefreshSession => Ok(RequestBody::RefreshSession),
        }
    }
}
