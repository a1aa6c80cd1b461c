use std::net::Ipv6Addr;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ip6out::ident::{IdentAllocator, IdentBuckets};
use ip6out::{Net, NetConfig, PktBuffer};

fn addrs() -> (Ipv6Addr, Ipv6Addr) {
    (
        "2001:db8:1::10".parse().unwrap(),
        "2001:db8:2::20".parse().unwrap(),
    )
}

pub fn b1(c: &mut Criterion) {
    let net = Net::new(NetConfig::default());
    let (src, dst) = addrs();
    c.bench_function("select_ident", |b| {
        b.iter(|| {
            let id = net.select_ident(black_box(&dst), black_box(&src));
            assert!(id != 0);
        })
    });
}

pub fn b2(c: &mut Criterion) {
    let net = Net::new(NetConfig::default());
    let (src, dst) = addrs();
    let mut hdr = [0u8; 40];
    hdr[0] = 0x60;
    hdr[8..24].copy_from_slice(&src.octets());
    hdr[24..40].copy_from_slice(&dst.octets());
    let mut buf = PktBuffer::new(&hdr);

    c.bench_function("proxy_select_ident", |b| {
        b.iter(|| {
            let id = net.proxy_select_ident(black_box(&mut buf)).unwrap();
            assert!(id != 0);
        })
    });
}

pub fn b3(c: &mut Criterion) {
    let idents = IdentBuckets::new(2048);
    let mut hash = 0u32;
    c.bench_function("ident_buckets_reserve", |b| {
        b.iter(|| {
            hash = hash.wrapping_add(0x9e37_79b9);
            black_box(idents.reserve(black_box(hash), 1));
        })
    });
}

criterion_group!(benches, b1, b2, b3);
criterion_main!(benches);
