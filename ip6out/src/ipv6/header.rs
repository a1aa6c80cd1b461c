#![allow(missing_docs)]

use std::net::Ipv6Addr;

use byteorder::{ByteOrder, NetworkEndian};

use super::IpProtocol;

/// A constant that defines the fixed byte length of the Ipv6 protocol header.
pub const IPV6_HEADER_LEN: usize = 40;

/// The largest payload length the base header can express.
pub const IPV6_MAXPLEN: usize = 65535;

/// Offset of the next header field inside the base header.
pub const NEXTHDR_OFFSET: usize = 6;

/// Offset of the source address inside the base header. The destination
/// address follows it immediately.
pub const SADDR_OFFSET: usize = 8;

/// A view of the fixed IPv6 base header.
#[derive(Clone, Copy, Debug)]
pub struct Ipv6Header<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> Ipv6Header<T> {
    /// Wrap `buf`, failing if it is shorter than the base header.
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        if buf.as_ref().len() >= IPV6_HEADER_LEN {
            Ok(Self { buf })
        } else {
            Err(buf)
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[0..IPV6_HEADER_LEN]
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.buf.as_ref()[0] >> 4
    }

    #[inline]
    pub fn payload_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.as_ref()[4..6])
    }

    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        self.buf.as_ref()[NEXTHDR_OFFSET].into()
    }

    #[inline]
    pub fn src_addr(&self) -> Ipv6Addr {
        let mut octets = [0; 16];
        octets.copy_from_slice(&self.buf.as_ref()[SADDR_OFFSET..SADDR_OFFSET + 16]);
        Ipv6Addr::from(octets)
    }

    #[inline]
    pub fn dst_addr(&self) -> Ipv6Addr {
        let mut octets = [0; 16];
        octets.copy_from_slice(&self.buf.as_ref()[SADDR_OFFSET + 16..IPV6_HEADER_LEN]);
        Ipv6Addr::from(octets)
    }
}

impl<T: AsMut<[u8]>> Ipv6Header<T> {
    #[inline]
    pub fn set_payload_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.buf.as_mut()[4..6], value);
    }

    #[inline]
    pub fn set_next_header(&mut self, value: IpProtocol) {
        self.buf.as_mut()[NEXTHDR_OFFSET] = value.into();
    }
}
