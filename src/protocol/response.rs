//! # Response Packets
//!
//! A response echoes its request's correlation id and operation, and carries
//! an application status code. A non-success status means every success-only
//! field is absent: such a response serializes as header plus error code and
//! nothing else, even if a body was populated in memory. The suppression is a
//! validated invariant of the encoder, and the decoder reports the body as
//! absent rather than ever producing garbage fields.

use crate::core::ident::{Guid, Identifier, Token};
use crate::core::wire::{
    get_guid, get_list, get_token, list_len, put_guid, put_list, put_token, WireDecode, WireEncode,
};
use crate::error::{ProtocolError, Result};
use crate::protocol::kind::{ErrorCode, Op};
use crate::protocol::records::{MessageInfo, RoomInfo, UserInfo};
use bytes::{Bytes, BytesMut};

/// One response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub correlation: Identifier,
    pub op: Op,
    pub status: ErrorCode,
    /// Present exactly when `status` is success.
    pub body: Option<ResponseBody>,
}

impl Response {
    /// A success response. The operation is taken from the body.
    pub fn ok(correlation: Identifier, body: ResponseBody) -> Self {
        Self {
            correlation,
            op: body.op(),
            status: ErrorCode::Success,
            body: Some(body),
        }
    }

    /// An application-error response: header and error code only.
    pub fn error(correlation: Identifier, op: Op, status: ErrorCode) -> Self {
        Self {
            correlation,
            op,
            status,
            body: None,
        }
    }

    /// Payload length this response serializes to. Zero whenever the status
    /// is not success, regardless of what the body field holds.
    pub fn payload_len(&self) -> usize {
        if !self.status.is_success() {
            return 0;
        }
        self.body.as_ref().map_or(0, ResponseBody::encoded_len)
    }

    /// Append the payload bytes to `dst`.
    ///
    /// An error-state response writes nothing here; a success response
    /// without a body, or with a body belonging to a different operation, is
    /// rejected before anything is written.
    pub fn encode_payload(&self, dst: &mut BytesMut) -> Result<()> {
        if !self.status.is_success() {
            return Ok(());
        }
        match &self.body {
            Some(body) if body.op() == self.op => body.encode(dst),
            Some(_) => Err(ProtocolError::Custom(String::from(
                "response body does not match its operation",
            ))),
            None => Err(ProtocolError::Custom(String::from(
                "success response without a body",
            ))),
        }
    }

    /// Decode the payload region for a known operation and status.
    pub fn decode_payload(
        correlation: Identifier,
        op: Op,
        status: ErrorCode,
        src: &mut Bytes,
    ) -> Result<Self> {
        let body = if status.is_success() {
            Some(ResponseBody::decode_for(op, src)?)
        } else {
            None
        };
        Ok(Self {
            correlation,
            op,
            status,
            body,
        })
    }
}

/// Operation-specific success payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Login {
        user: UserInfo,
        session_id: Guid,
    },
    Logout,
    Register {
        user: UserInfo,
    },
    FetchMessages {
        messages: Vec<MessageInfo>,
    },
    FetchUsers {
        users: Vec<UserInfo>,
    },
    MessagePost {
        message: MessageInfo,
    },
    RoomCreate {
        room: RoomInfo,
    },
    RoomDelete,
    JoinRoom {
        room: RoomInfo,
    },
    LeaveRoom,
    KickUser,
    FetchRooms {
        rooms: Vec<RoomInfo>,
    },
    RefreshSession {
        access_token: Token,
        refresh_token: Token,
    },
}

impl ResponseBody {
    /// The operation this body answers.
    pub fn op(&self) -> Op {
        match self {
            ResponseBody::Login { .. } => Op::Login,
            ResponseBody::Logout => Op::Logout,
            ResponseBody::Register { .. } => Op::Register,
            ResponseBody::FetchMessages { .. } => Op::FetchMessages,
            ResponseBody::FetchUsers { .. } => Op::FetchUsers,
            ResponseBody::MessagePost { .. } => Op::MessagePost,
            ResponseBody::RoomCreate { .. } => Op::RoomCreate,
            ResponseBody::RoomDelete => Op::RoomDelete,
            ResponseBody::JoinRoom { .. } => Op::JoinRoom,
            ResponseBody::LeaveRoom => Op::LeaveRoom,
            ResponseBody::KickUser => Op::KickUser,
            ResponseBody::FetchRooms { .. } => Op::FetchRooms,
            ResponseBody::RefreshSession { .. } => Op::RefreshSession,
        }
    }

    /// Exact payload length in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            ResponseBody::Login { user, .. } => user.encoded_len() + Guid::SIZE,
            ResponseBody::Logout
            | ResponseBody::RoomDelete
            | ResponseBody::LeaveRoom
            | ResponseBody::KickUser => 0,
            ResponseBody::Register { user } => user.encoded_len(),
            ResponseBody::FetchMessages { messages } => list_len(messages),
            ResponseBody::FetchUsers { users } => list_len(users),
            ResponseBody::MessagePost { message } => message.encoded_len(),
            ResponseBody::RoomCreate { room } | ResponseBody::JoinRoom { room } => {
                room.encoded_len()
            }
            ResponseBody::FetchRooms { rooms } => list_len(rooms),
            ResponseBody::RefreshSession { .. } => Token::SIZE * 2,
        }
    }

    /// Append the payload bytes to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        match self {
            ResponseBody::Login { user, session_id } => {
                user.encode(dst)?;
                put_guid(dst, session_id);
                Ok(())
            }
            ResponseBody::Logout
            | ResponseBody::RoomDelete
            | ResponseBody::LeaveRoom
            | ResponseBody::KickUser => Ok(()),
            ResponseBody::Register { user } => user.encode(dst),
            ResponseBody::FetchMessages { messages } => put_list(dst, messages),
            ResponseBody::FetchUsers { users } => put_list(dst, users),
            ResponseBody::MessagePost { message } => message.encode(dst),
            ResponseBody::RoomCreate { room } | ResponseBody::JoinRoom { room } => room.encode(dst),
            ResponseBody::FetchRooms { rooms } => put_list(dst, rooms),
            ResponseBody::RefreshSession {
                access_token,
                refresh_token,
            } => {
                put_token(dst, access_token);
                put_token(dst, refresh_token);
                Ok(())
            }
        }
    }

    /// Decode the payload for a known operation.
    pub fn decode_for(op: Op, src: &mut Bytes) -> Result<Self> {
        match op {
            Op::Login => Ok(ResponseBody::Login {
                user: UserInfo::decode(src)?,
                session_id: get_guid(src)?,
            }),
            Op::Logout => Ok(ResponseBody::Logout),
            Op::Register => Ok(ResponseBody::Register {
                user: UserInfo::decode(src)?,
            }),
            Op::FetchMessages => Ok(ResponseBody::FetchMessages {
                messages: get_list(src)?,
            }),
            Op::FetchUsers => Ok(ResponseBody::FetchUsers {
                users: get_list(src)?,
            }),
            Op::MessagePost => Ok(ResponseBody::MessagePost {
                message: MessageInfo::decode(src)?,
            }),
            Op::RoomCreate => Ok(ResponseBody::RoomCreate {
                room: RoomInfo::decode(src)?,
            }),
            Op::RoomDelete => Ok(ResponseBody::RoomDelete),
            Op::JoinRoom => Ok(ResponseBody::JoinRoom {
                room: RoomInfo::decode(src)?,
            }),
            Op::LeaveRoom => Ok(ResponseBody::LeaveRoom),
            Op::KickUser => Ok(ResponseBody::KickUser),
            Op::FetchRooms => Ok(ResponseBody::FetchRooms {
                rooms: get_list(src)?,
            }),
            Op::RefreshSession => Ok(ResponseBody::RefreshSession {
                access_token: get_token(src)?,
                refresh_token: get_token(src)?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserInfo {
        UserInfo {
            id: Identifier::from_parts(100, 1, 1),
            username: String::from("ada"),
            display_name: String::from("Ada L."),
        }
    }

    #[test]
    fn error_response_payload_is_empty_even_with_body_populated() {
        // a body left over from a success path must be suppressed
        let response = Response {
            correlation: Identifier::from_parts(1, 2, 3),
            op: Op::Login,
            status: ErrorCode::InvalidCredentials,
            body: Some(ResponseBody::Login {
                user: sample_user(),
                session_id: Guid::new_random(),
            }),
        };
        assert_eq!(response.payload_len(), 0);

        let mut buf = BytesMut::new();
        response.encode_payload(&mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn error_response_decodes_with_absent_body() {
        let mut src = Bytes::new();
        let decoded = Response::decode_payload(
            Identifier::from_parts(1, 2, 3),
            Op::Login,
            ErrorCode::UnknownRoom,
            &mut src,
        )
        .unwrap();
        assert_eq!(decoded.body, None);
    }

    #[test]
    fn success_without_body_is_rejected() {
        let response = Response {
            correlation: Identifier::MIN,
            op: Op::Logout,
            status: ErrorCode::Success,
            body: None,
        };
        let mut buf = BytesMut::new();
        assert!(response.encode_payload(&mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn mismatched_body_op_is_rejected() {
        let response = Response {
            correlation: Identifier::MIN,
            op: Op::Login,
            status: ErrorCode::Success,
            body: Some(ResponseBody::Logout),
        };
        let mut buf = BytesMut::new();
        assert!(response.encode_payload(&mut buf).is_err());
    }

    #[test]
    fn success_payload_roundtrips() {
        let response = Response::ok(
            Identifier::from_parts(9, 9, 9),
            ResponseBody::FetchUsers {
                users: vec![sample_user()],
            },
        );
        let mut buf = BytesMut::new();
        response.encode_payload(&mut buf).unwrap();
        assert_eq!(buf.len(), response.payload_len());

        let mut src = buf.freeze();
        let decoded = Response::decode_payload(
            response.correlation,
            Op::FetchUsers,
            ErrorCode::Success,
            &mut src,
        )
        .unwrap();
        assert_eq!(decoded, response);
    }
}
