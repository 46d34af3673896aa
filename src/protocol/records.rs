//! # Payload Records
//!
//! Nested sub-records carried inside request, response, and broadcast
//! payloads. Persistence collaborators construct and consume these; they
//! never see header bytes.

use crate::core::ident::Identifier;
use crate::core::wire::{
    get_ident, get_ident_list, get_string, ident_list_len, put_ident, put_ident_list, put_string,
    string_len, WireDecode, WireEncode,
};
use crate::error::Result;
use bytes::{Bytes, BytesMut};

/// One user as other peers see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: Identifier,
    pub username: String,
    pub display_name: String,
}

impl WireEncode for UserInfo {
    fn encoded_len(&self) -> usize {
        Identifier::SIZE + string_len(&self.username) + string_len(&self.display_name)
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        put_ident(dst, &self.id);
        put_string(dst, &self.username)?;
        put_string(dst, &self.display_name)
    }
}

impl WireDecode for UserInfo {
    fn decode(src: &mut Bytes) -> Result<Self> {
        Ok(Self {
            id: get_ident(src)?,
            username: get_string(src)?,
            display_name: get_string(src)?,
        })
    }
}

/// One chat room, including its membership roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: Identifier,
    pub name: String,
    pub owner: Identifier,
    pub members: Vec<Identifier>,
}

impl WireEncode for RoomInfo {
    fn encoded_len(&self) -> usize {
        Identifier::SIZE + string_len(&self.name) + Identifier::SIZE + ident_list_len(&self.members)
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        put_ident(dst, &self.id);
        put_string(dst, &self.name)?;
        put_ident(dst, &self.owner);
        put_ident_list(dst, &self.members)
    }
}

impl WireDecode for RoomInfo {
    fn decode(src: &mut Bytes) -> Result<Self> {
        Ok(Self {
            id: get_ident(src)?,
            name: get_string(src)?,
            owner: get_ident(src)?,
            members: get_ident_list(src)?,
        })
    }
}

/// One posted message. The post time lives in the message id's timestamp
/// bits; there is no separate wire field for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub id: Identifier,
    pub room: Identifier,
    pub author: Identifier,
    pub body: String,
}

impl MessageInfo {
    /// Millisecond post time recovered from the id.
    pub fn posted_at_ms(&self) -> u64 {
        self.id.timestamp()
    }
}

impl WireEncode for MessageInfo {
    fn encoded_len(&self) -> usize {
        Identifier::SIZE * 3 + string_len(&self.body)
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        put_ident(dst, &self.id);
        put_ident(dst, &self.room);
        put_ident(dst, &self.author);
        put_string(dst, &self.body)
    }
}

impl WireDecode for MessageInfo {
    fn decode(src: &mut Bytes) -> Result<Self> {
        Ok(Self {
            id: get_ident(src)?,
            room: get_ident(src)?,
            author: get_ident(src)?,
            body: get_string(src)?,
        })
    }
}
