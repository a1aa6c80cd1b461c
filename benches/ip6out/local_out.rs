use std::sync::Arc;

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ip6out::output::{HookList, NfHook, NfProto, NfVerdict};
use ip6out::{Ip6Output, Net, NetDevice, PktBuf, PktBuffer, Result, Route, Status};

fn routed(payload: usize) -> PktBuffer {
    let mut hdr = [0u8; 40];
    hdr[0] = 0x60;
    hdr[6] = 17;
    let mut buf = PktBuffer::new(&hdr);
    buf.push_frag(Bytes::from(vec![0u8; payload]));

    let dev = Arc::new(NetDevice {
        name: "eth0".to_string(),
        ifindex: 2,
        mtu: 1500,
    });
    buf.set_dst(Route::new(
        dev,
        "2001:db8:1::10".parse().unwrap(),
        "2001:db8:2::20".parse().unwrap(),
    ));
    buf
}

pub fn b1(c: &mut Criterion) {
    let net = Net::default();
    let mut buf = routed(1200);
    let out = Ip6Output::new(
        HookList::new(),
        |_: &Net, buf: &mut PktBuffer| -> Result<Status> {
            black_box(buf.len());
            Ok(Status::SUCCESS)
        },
    );

    c.bench_function("local_out_no_hooks", |b| {
        b.iter(|| {
            let res = out.local_out(&net, black_box(&mut buf));
            assert!(res == Ok(Status::SUCCESS));
        })
    });
}

pub fn b2(c: &mut Criterion) {
    let net = Net::default();
    let mut buf = routed(1200);
    let mut hooks = HookList::new();
    for priority in 0..4 {
        hooks.register(NfProto::IPV6, NfHook::LOCAL_OUT, priority, |_, _: &mut PktBuffer| {
            NfVerdict::Accept
        });
    }
    let out = Ip6Output::new(
        hooks,
        |_: &Net, buf: &mut PktBuffer| -> Result<Status> {
            black_box(buf.len());
            Ok(Status::SUCCESS)
        },
    );

    c.bench_function("local_out_4_hooks", |b| {
        b.iter(|| {
            let res = out.local_out(&net, black_box(&mut buf));
            assert!(res == Ok(Status::SUCCESS));
        })
    });
}

criterion_group!(benches, b1, b2);
criterion_main!(benches);
