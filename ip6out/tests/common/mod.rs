#![allow(dead_code)]

use std::net::Ipv6Addr;
use std::sync::Arc;

use smoltcp::wire::{IpProtocol as SmolProtocol, Ipv6Address, Ipv6Packet, Ipv6Repr};

use ip6out::ipv6::IpProtocol;
use ip6out::{NetDevice, PktBuffer, Route};

pub fn src_addr() -> Ipv6Addr {
    "2001:db8:1::10".parse().unwrap()
}

pub fn dst_addr() -> Ipv6Addr {
    "2001:db8:2::20".parse().unwrap()
}

/// Build an IPv6 packet with smoltcp.
///
/// Each `(next, hdr_ext_len)` entry appends an extension header whose own
/// type is named by the previous header and whose next header is `next`.
pub fn ipv6_packet(first: IpProtocol, exts: &[(IpProtocol, u8)], payload: usize) -> Vec<u8> {
    let ext_len: usize = exts
        .iter()
        .map(|(_, hdr_ext_len)| (usize::from(*hdr_ext_len) + 1) * 8)
        .sum();
    let mut buf = vec![0u8; 40 + ext_len + payload];

    let repr = Ipv6Repr {
        src_addr: Ipv6Address::from_bytes(&src_addr().octets()),
        dst_addr: Ipv6Address::from_bytes(&dst_addr().octets()),
        next_header: SmolProtocol::from(u8::from(first)),
        payload_len: ext_len + payload,
        hop_limit: 64,
    };
    repr.emit(&mut Ipv6Packet::new_unchecked(&mut buf[..]));

    let mut offset = 40;
    for (next, hdr_ext_len) in exts {
        buf[offset] = u8::from(*next);
        buf[offset + 1] = *hdr_ext_len;
        offset += (usize::from(*hdr_ext_len) + 1) * 8;
    }
    buf
}

pub fn device() -> Arc<NetDevice> {
    Arc::new(NetDevice {
        name: "eth0".to_string(),
        ifindex: 2,
        mtu: 1500,
    })
}

pub fn route() -> Route {
    Route::new(device(), src_addr(), dst_addr())
}

/// Wrap `pkt` in a buffer with `l2_len` bytes of link-layer header in front
/// of the network header and a route attached.
pub fn routed_buffer(pkt: &[u8], l2_len: usize) -> PktBuffer {
    let mut data = vec![0xaau8; l2_len];
    data.extend_from_slice(pkt);
    let mut buf = PktBuffer::new(&data);
    buf.set_network_offset(l2_len);
    buf.set_dst(route());
    buf
}
