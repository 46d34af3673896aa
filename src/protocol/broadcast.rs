//! # Broadcast Packets
//!
//! Broadcasts carry no requester identity and expect no reply: the sender
//! fires them at whoever is connected, and a dispatch collaborator outside
//! this crate decides the fan-out. On the wire they are the smallest frames,
//! header plus event payload.

use crate::core::ident::Identifier;
use crate::core::wire::{get_ident, put_ident, WireDecode, WireEncode};
use crate::error::Result;
use crate::protocol::kind::Event;
use crate::protocol::records::{MessageInfo, RoomInfo, UserInfo};
use bytes::{Bytes, BytesMut};

/// One unsolicited event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Broadcast {
    RoomCreated { room: RoomInfo },
    RoomDeleted { room: Identifier },
    MessagePosted { message: MessageInfo },
    UserJoined { room: Identifier, user: UserInfo },
    UserLeft { room: Identifier, user: Identifier },
    UserKicked { room: Identifier, user: Identifier },
}

impl Broadcast {
    /// The event this broadcast announces.
    pub fn event(&self) -> Event {
        match self {
            Broadcast::RoomCreated { .. } => Event::RoomCreated,
            Broadcast::RoomDeleted { .. } => Event::RoomDeleted,
            Broadcast::MessagePosted { .. } => Event::MessagePosted,
            Broadcast::UserJoined { .. } => Event::UserJoined,
            Broadcast::UserLeft { .. } => Event::UserLeft,
            Broadcast::UserKicked { .. } => Event::UserKicked,
        }
    }

    /// Exact payload length in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Broadcast::RoomCreated { room } => room.encoded_len(),
            Broadcast::RoomDeleted { .. } => Identifier::SIZE,
            Broadcast::MessagePosted { message } => message.encoded_len(),
            Broadcast::UserJoined { user, .. } => Identifier::SIZE + user.encoded_len(),
            Broadcast::UserLeft { .. } | Broadcast::UserKicked { .. } => Identifier::SIZE * 2,
        }
    }

    /// Append the payload bytes to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        match self {
            Broadcast::RoomCreated { room } => room.encode(dst),
            Broadcast::RoomDeleted { room } => {
                put_ident(dst, room);
                Ok(())
            }
            Broadcast::MessagePosted { message } => message.encode(dst),
            Broadcast::UserJoined { room, user } => {
                put_ident(dst, room);
                user.encode(dst)
            }
            Broadcast::UserLeft { room, user } | Broadcast::UserKicked { room, user } => {
                put_ident(dst, room);
                put_ident(dst, user);
                Ok(())
            }
        }
    }

    /// Decode the payload for a known event.
    pub fn decode_for(event: Event, src: &mut Bytes) -> Result<Self> {
        match event {
            Event::RoomCreated => Ok(Broadcast::RoomCreated {
                room: RoomInfo::decode(src)?,
            }),
            Event::RoomDeleted => Ok(Broadcast::RoomDeleted {
                room: get_ident(src)?,
            }),
            Event::MessagePosted => Ok(Broadcast::MessagePosted {
                message: MessageInfo::decode(src)?,
            }),
            Event::UserJoined => Ok(Broadcast::UserJoined {
                room: get_ident(src)?,
                user: UserInfo::decode(src)?,
            }),
            Event::UserLeft => Ok(Broadcast::UserLeft {
                room: get_ident(src)?,
                user: get_ident(src)?,
            }),
            Event::UserKicked => Ok(Broadcast::UserKicked {
                room: get_ident(src)?,
                user: get_ident(src)?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wire::expect_consumed;

    #[test]
    fn every_broadcast_roundtrips() {
        let room = Identifier::from_parts(20, 0, 1);
        let user = Identifier::from_parts(21, 0, 2);
        for broadcast in [
            Broadcast::RoomCreated {
                room: RoomInfo {
                    id: room,
                    name: String::from("general"),
                    owner: user,
                    members: vec![user],
                },
            },
            Broadcast::RoomDeleted { room },
            Broadcast::MessagePosted {
                message: MessageInfo {
                    id: Identifier::from_parts(22, 0, 3),
                    room,
                    author: user,
                    body: String::from("hi"),
                },
            },
            Broadcast::UserJoined {
                room,
                user: UserInfo {
                    id: user,
                    username: String::from("ada"),
                    display_name: String::from("Ada L."),
                },
            },
            Broadcast::UserLeft { room, user },
            Broadcast::UserKicked { room, user },
        ] {
            let mut buf = BytesMut::new();
            broadcast.encode(&mut buf).unwrap();
            assert_eq!(buf.len(), broadcast.encoded_len(), "{:?}", broadcast.event());

            let mut src = buf.freeze();
            let decoded = Broadcast::decode_for(broadcast.event(), &mut src).unwrap();
            assert_eq!(decoded, broadcast);
            expect_consumed(&src).unwrap();
        }
    }
}
