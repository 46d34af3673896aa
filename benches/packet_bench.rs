use bytes::BytesMut;
use chat_protocol::core::codec::PacketCodec;
use chat_protocol::core::wire::WireEncode;
use chat_protocol::{
    Credentials, Guid, Identifier, Packet, Request, RequestBody,
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tokio_util::codec::Encoder;

fn message_post(body_size: usize) -> Packet {
    Packet::Request(Request {
        correlation: Identifier::from_parts(1_700_000_000_000, 1, 2),
        credentials: Credentials::Session {
            user_id: Guid::from_bytes([0x01; 16]),
            session_id: Guid::from_bytes([0x02; 16]),
        },
        body: RequestBody::MessagePost {
            room: Identifier::from_parts(1_700_000_100_000, 0, 2),
            body: "x".repeat(body_size),
        },
    })
}

#[allow(clippy::unwrap_used)]
fn bench_packet_encode_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_encode_decode");
    let body_sizes = [64usize, 512, 4096, 65536];

    for &size in &body_sizes {
        let packet = message_post(size);
        group.throughput(Throughput::Bytes(packet.encoded_len() as u64));
        group.bench_function(format!("encode_{size}b"), |b| {
            b.iter_batched(
                || message_post(size),
                |packet| {
                    let mut buf = BytesMut::with_capacity(packet.encoded_len());
                    let mut codec = PacketCodec::default();
                    codec.encode(packet, &mut buf).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("decode_{size}b"), |b| {
            let frame = message_post(size).to_wire_bytes().unwrap();
            b.iter(|| {
                let decoded = Packet::from_bytes(&frame);
                assert!(decoded.is_ok());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_packet_encode_decode);
criterion_main!(benches);
