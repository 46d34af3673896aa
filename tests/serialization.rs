//! Integration tests for full-frame serialization
//!
//! Exercises complete encode/decode trips over every frame role, both
//! credential generations, and the nested payload records, checking byte
//! counts against the declared layouts.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::uninlined_format_args
)]

use chat_protocol::core::header::{
    BROADCAST_SIZE, REQUEST_SESSION_SIZE, REQUEST_TOKEN_SIZE, RESPONSE_SIZE,
};
use chat_protocol::core::wire::WireEncode;
use chat_protocol::{
    Broadcast, Credentials, ErrorCode, Guid, Identifier, MessageInfo, Op, Packet, Request,
    RequestBody, Response, ResponseBody, RoomInfo, Token, UserInfo,
};

fn user() -> UserInfo {
    UserInfo {
        id: Identifier::from_parts(1_690_000_000_000, 12, 1),
        username: String::from("grace"),
        display_name: String::from("Grace Hopper"),
    }
}

fn room() -> RoomInfo {
    RoomInfo {
        id: Identifier::from_parts(1_690_000_111_000, 0, 1),
        name: String::from("compilers"),
        owner: user().id,
        members: vec![user().id],
    }
}

#[test]
fn session_request_frame_layout() {
    let packet = Packet::Request(Request {
        correlation: Identifier::from_parts(1, 2, 3),
        credentials: Credentials::Session {
            user_id: Guid::from_bytes([0xAB; 16]),
            session_id: Guid::from_bytes([0xCD; 16]),
        },
        body: RequestBody::RoomCreate {
            name: String::from("compilers"),
        },
    });

    let bytes = packet.to_wire_bytes().expect("encode");
    // header + string field (4-byte count + 9 bytes of utf-8)
    assert_eq!(bytes.len(), REQUEST_SESSION_SIZE + 4 + 9);
    assert_eq!(bytes.len(), packet.encoded_len());
    assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);
}

#[test]
fn token_request_frame_layout() {
    let packet = Packet::Request(Request {
        correlation: Identifier::from_parts(4, 5, 6),
        credentials: Credentials::Token {
            user_id: Identifier::from_parts(7, 8, 9),
            access_token: Token::from_bytes([0x01; 16]),
            refresh_token: Token::from_bytes([0x02; 16]),
        },
        body: RequestBody::RefreshSession,
    });

    let bytes = packet.to_wire_bytes().expect("encode");
    // an empty body: the frame is exactly the token-generation header
    assert_eq!(bytes.len(), REQUEST_TOKEN_SIZE);
    assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);
}

#[test]
fn both_generations_decode_side_by_side() {
    // the discriminant, not the header length, selects the generation
    let session = Packet::Request(Request {
        correlation: Identifier::from_parts(1, 0, 0),
        credentials: Credentials::Session {
            user_id: Guid::NIL,
            session_id: Guid::NIL,
        },
        body: RequestBody::FetchRooms,
    });
    let token = Packet::Request(Request {
        correlation: Identifier::from_parts(2, 0, 0),
        credentials: Credentials::Token {
            user_id: Identifier::from_parts(3, 0, 0),
            access_token: Token::NIL,
            refresh_token: Token::NIL,
        },
        body: RequestBody::FetchRooms,
    });

    for packet in [session, token] {
        let bytes = packet.to_wire_bytes().expect("encode");
        assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);
    }
}

#[test]
fn success_response_with_nested_records() {
    let packet = Packet::Response(Response::ok(
        Identifier::from_parts(10, 20, 30),
        ResponseBody::FetchRooms {
            rooms: vec![room(), room()],
        },
    ));

    let bytes = packet.to_wire_bytes().expect("encode");
    let expected_payload = 4 + 2 * room().encoded_len();
    assert_eq!(bytes.len(), RESPONSE_SIZE + expected_payload);
    assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);
}

#[test]
fn error_response_suppresses_populated_body() {
    // an error-state response with success fields still populated must
    // serialize to header plus error code alone
    let packet = Packet::Response(Response {
        correlation: Identifier::from_parts(10, 20, 30),
        op: Op::FetchRooms,
        status: ErrorCode::SessionExpired,
        body: Some(ResponseBody::FetchRooms {
            rooms: vec![room()],
        }),
    });

    let bytes = packet.to_wire_bytes().expect("encode");
    assert_eq!(bytes.len(), RESPONSE_SIZE);

    match Packet::from_bytes(&bytes).expect("decode") {
        Packet::Response(response) => {
            assert_eq!(response.status, ErrorCode::SessionExpired);
            assert!(response.body.is_none(), "success fields must read as absent");
        }
        other => panic!("expected response, got {:?}", other),
    }
}

#[test]
fn broadcast_frame_layout() {
    let message = MessageInfo {
        id: Identifier::from_parts(1_690_000_222_000, 3, 1),
        room: room().id,
        author: user().id,
        body: String::from("ship it"),
    };
    let packet = Packet::Broadcast(Broadcast::MessagePosted {
        message: message.clone(),
    });

    let bytes = packet.to_wire_bytes().expect("encode");
    assert_eq!(bytes.len(), BROADCAST_SIZE + message.encoded_len());
    assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);
}

#[test]
fn empty_collections_and_strings_are_valid() {
    let packet = Packet::Response(Response::ok(
        Identifier::from_parts(1, 1, 1),
        ResponseBody::FetchMessages { messages: vec![] },
    ));
    let bytes = packet.to_wire_bytes().expect("encode");
    assert_eq!(bytes.len(), RESPONSE_SIZE + 4);
    assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);

    let packet = Packet::Request(Request {
        correlation: Identifier::from_parts(1, 1, 2),
        credentials: Credentials::Session {
            user_id: Guid::NIL,
            session_id: Guid::NIL,
        },
        body: RequestBody::MessagePost {
            room: room().id,
            body: String::new(),
        },
    });
    let bytes = packet.to_wire_bytes().expect("encode");
    assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);
}

#[test]
fn serialization_is_deterministic() {
    let packet = Packet::Broadcast(Broadcast::RoomCreated { room: room() });
    let first = packet.to_wire_bytes().expect("encode");
    let second = packet.to_wire_bytes().expect("encode");
    assert_eq!(first, second);
}

#[test]
fn unicode_strings_roundtrip() {
    let packet = Packet::Request(Request {
        correlation: Identifier::from_parts(1, 1, 3),
        credentials: Credentials::Session {
            user_id: Guid::NIL,
            session_id: Guid::NIL,
        },
        body: RequestBody::MessagePost {
            room: room().id,
            body: String::from("héllo wörld — こんにちは 🦀"),
        },
    });
    let bytes = packet.to_wire_bytes().expect("encode");
    assert_eq!(bytes.len(), packet.encoded_len());
    assert_eq!(Packet::from_bytes(&bytes).expect("decode"), packet);
}
