//! # Packet Type Discriminants
//!
//! Every frame carries a 4-byte discriminant immediately after the signature.
//! The high word selects the header role (and, for requests, the credential
//! generation); the low word selects the operation. Both words are closed
//! sets: a value outside either set is a decode failure, never a silent
//! default.
//!
//! ```text
//! [Role(2)] [Operation(2)]
//! ```

use crate::error::{ProtocolError, Result};

/// Role word: request carrying guid credentials (first header generation).
pub const ROLE_REQUEST_SESSION: u16 = 0x0001;
/// Role word: response.
pub const ROLE_RESPONSE: u16 = 0x0002;
/// Role word: broadcast.
pub const ROLE_BROADCAST: u16 = 0x0003;
/// Role word: request carrying identifier + token credentials (second
/// header generation).
pub const ROLE_REQUEST_TOKEN: u16 = 0x0011;

/// Compose a discriminant from its role and operation words.
pub fn compose(role: u16, op: u16) -> u32 {
    ((role as u32) << 16) | op as u32
}

/// Split a discriminant into its role and operation words.
pub fn split(kind: u32) -> (u16, u16) {
    ((kind >> 16) as u16, kind as u16)
}

/// Operations that travel as a request and come back as exactly one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Op {
    Login = 0x0001,
    Logout = 0x0002,
    Register = 0x0003,
    FetchMessages = 0x0004,
    FetchUsers = 0x0005,
    MessagePost = 0x0006,
    RoomCreate = 0x0007,
    RoomDelete = 0x0008,
    JoinRoom = 0x0009,
    LeaveRoom = 0x000A,
    KickUser = 0x000B,
    FetchRooms = 0x000C,
    /// Exchange a refresh token for a fresh access/refresh pair. Only valid
    /// with token credentials.
    RefreshSession = 0x000D,
}

impl Op {
    /// The operation word.
    pub fn word(self) -> u16 {
        self as u16
    }

    /// Decode an operation word.
    pub fn from_word(word: u16) -> Option<Self> {
        match word {
            0x0001 => Some(Op::Login),
            0x0002 => Some(Op::Logout),
            0x0003 => Some(Op::Register),
            0x0004 => Some(Op::FetchMessages),
            0x0005 => Some(Op::FetchUsers),
            0x0006 => Some(Op::MessagePost),
            0x0007 => Some(Op::RoomCreate),
            0x0008 => Some(Op::RoomDelete),
            0x0009 => Some(Op::JoinRoom),
            0x000A => Some(Op::LeaveRoom),
            0x000B => Some(Op::KickUser),
            0x000C => Some(Op::FetchRooms),
            0x000D => Some(Op::RefreshSession),
            _ => None,
        }
    }

    /// Human-readable name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Op::Login => "login",
            Op::Logout => "logout",
            Op::Register => "register",
            Op::FetchMessages => "fetch_messages",
            Op::FetchUsers => "fetch_users",
            Op::MessagePost => "message_post",
            Op::RoomCreate => "room_create",
            Op::RoomDelete => "room_delete",
            Op::JoinRoom => "join_room",
            Op::LeaveRoom => "leave_room",
            Op::KickUser => "kick_user",
            Op::FetchRooms => "fetch_rooms",
            Op::RefreshSession => "refresh_session",
        }
    }
}

/// Unsolicited events fanned out to connected peers. No originating request,
/// no reply expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Event {
    RoomCreated = 0x0001,
    RoomDeleted = 0x0002,
    MessagePosted = 0x0003,
    UserJoined = 0x0004,
    UserLeft = 0x0005,
    UserKicked = 0x0006,
}

impl Event {
    /// The operation word.
    pub fn word(self) -> u16 {
        self as u16
    }

    /// Decode an event word.
    pub fn from_word(word: u16) -> Option<Self> {
        match word {
            0x0001 => Some(Event::RoomCreated),
            0x0002 => Some(Event::RoomDeleted),
            0x0003 => Some(Event::MessagePosted),
            0x0004 => Some(Event::UserJoined),
            0x0005 => Some(Event::UserLeft),
            0x0006 => Some(Event::UserKicked),
            _ => None,
        }
    }

    /// Human-readable name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Event::RoomCreated => "room_created",
            Event::RoomDeleted => "room_deleted",
            Event::MessagePosted => "message_posted",
            Event::UserJoined => "user_joined",
            Event::UserLeft => "user_left",
            Event::UserKicked => "user_kicked",
        }
    }
}

/// Application-level status carried by every response. Anything other than
/// `Success` means the response body is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    InvalidCredentials = 1,
    SessionExpired = 2,
    UnknownUser = 3,
    UnknownRoom = 4,
    NotAMember = 5,
    NotRoomOwner = 6,
    AlreadyMember = 7,
    NameTaken = 8,
    WriteConflict = 9,
    MalformedRequest = 10,
    UnsupportedOperation = 11,
}

impl ErrorCode {
    /// The wire value.
    pub fn value(self) -> u32 {
        self as u32
    }

    /// Decode a wire value. The set is closed: unknown codes are rejected
    /// with the same strictness as unknown packet types.
    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::InvalidCredentials),
            2 => Ok(ErrorCode::SessionExpired),
            3 => Ok(ErrorCode::UnknownUser),
            4 => Ok(ErrorCode::UnknownRoom),
            5 => Ok(ErrorCode::NotAMember),
            6 => Ok(ErrorCode::NotRoomOwner),
            7 => Ok(ErrorCode::AlreadyMember),
            8 => Ok(ErrorCode::NameTaken),
            9 => Ok(ErrorCode::WriteConflict),
            10 => Ok(ErrorCode::MalformedRequest),
            11 => Ok(ErrorCode::UnsupportedOperation),
            other => Err(ProtocolError::UnknownErrorCode(other)),
        }
    }

    /// Whether this code reports success.
    pub fn is_success(self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}
