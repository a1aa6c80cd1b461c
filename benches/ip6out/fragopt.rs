use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ip6out::ipv6::*;

// base header, hop-by-hop, routing (24 bytes), destination options, udp
fn chain() -> Vec<u8> {
    let mut buf = vec![0u8; 40 + 8 + 24 + 8 + 8];
    buf[0] = 0x60;
    buf[4..6].copy_from_slice(&48u16.to_be_bytes());
    buf[6] = IpProtocol::HOPOPT.into();
    buf[40] = IpProtocol::IPV6_ROUTE.into();
    buf[48] = IpProtocol::IPV6_OPTS.into();
    buf[49] = 2;
    buf[72] = IpProtocol::UDP.into();
    buf
}

fn no_ext() -> Vec<u8> {
    let mut buf = vec![0u8; 48];
    buf[0] = 0x60;
    buf[6] = IpProtocol::UDP.into();
    buf
}

pub fn b1(c: &mut Criterion) {
    let buf = no_ext();
    let finder = FragOptFinder::new();
    c.bench_function("fragopt_no_ext", |b| {
        b.iter(|| {
            let res = finder.find(black_box(&buf[..])).unwrap();
            assert!(res.offset == IPV6_HEADER_LEN);
        })
    });
}

pub fn b2(c: &mut Criterion) {
    let buf = chain();
    let finder = FragOptFinder::new();
    c.bench_function("fragopt_chain", |b| {
        b.iter(|| {
            let res = finder.find(black_box(&buf[..])).unwrap();
            assert!(res.offset == 72);
        })
    });
}

pub fn b3(c: &mut Criterion) {
    let buf = chain();
    let finder = FragOptFinder::new().mip6(true);
    c.bench_function("fragopt_chain_mip6", |b| {
        b.iter(|| {
            let res = finder.find(black_box(&buf[..])).unwrap();
            assert!(res.offset == 72);
        })
    });
}

criterion_group!(benches, b1, b2, b3);
criterion_main!(benches);
