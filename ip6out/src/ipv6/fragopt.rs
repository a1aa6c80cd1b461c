use log::debug;

use crate::error::{Error, Result};
use crate::traits::PktBuf;

use super::option::{find_tlv, Ipv6OptHeader, IPV6_TLV_HAO};
use super::{IpProtocol, IPV6_HEADER_LEN, IPV6_MAXPLEN, NEXTHDR_OFFSET};

/// Where a fragment header goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragOpt {
    /// Offset of the fragment header, relative to the network header.
    pub offset: usize,
    /// Offset of the next-header byte that names the header at `offset`.
    /// A fragmenter rewrites this byte to [`IpProtocol::IPV6_FRAG`].
    pub nexthdr_off: usize,
}

/// Locate the first byte of the fragmentable part of an IPv6 packet.
///
/// The unfragmentable part is the base header followed by any hop-by-hop,
/// routing and destination options headers that precede a routing header.
/// A destination options header after a routing header belongs to the
/// fragmentable part, unless it carries a home address option and mobile
/// IPv6 support is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragOptFinder {
    mip6: bool,
}

impl Default for FragOptFinder {
    fn default() -> Self {
        Self {
            mip6: cfg!(feature = "mip6"),
        }
    }
}

impl FragOptFinder {
    /// Create a finder without mobile IPv6 support.
    pub const fn new() -> Self {
        Self { mip6: false }
    }

    /// Enable or disable the home address option exception.
    pub const fn mip6(mut self, enable: bool) -> Self {
        self.mip6 = enable;
        self
    }

    /// Whether the home address option exception is enabled.
    pub const fn mip6_enabled(&self) -> bool {
        self.mip6
    }

    /// Walk the extension headers of the packet in `buf`.
    #[inline]
    pub fn find_in<B: PktBuf + ?Sized>(&self, buf: &B) -> Result<FragOpt> {
        self.find(buf.network_header())
    }

    /// Walk the extension headers of `nh`, which starts at the IPv6 base
    /// header and ends at the tail of the linear data.
    pub fn find(&self, nh: &[u8]) -> Result<FragOpt> {
        let packet_len = nh.len();
        if packet_len < IPV6_HEADER_LEN {
            return Err(Error::BufferUnavailable {
                offset: 0,
                len: IPV6_HEADER_LEN,
            });
        }

        let mut offset = IPV6_HEADER_LEN;
        let mut nexthdr_off = NEXTHDR_OFFSET;
        let mut found_rhdr = false;

        while offset <= packet_len {
            match IpProtocol::from(nh[nexthdr_off]) {
                IpProtocol::HOPOPT => {}
                IpProtocol::IPV6_ROUTE => found_rhdr = true,
                IpProtocol::IPV6_OPTS => {
                    let hao = self.mip6 && find_tlv(nh, offset, IPV6_TLV_HAO).is_some();
                    if !hao && found_rhdr {
                        return Ok(FragOpt {
                            offset,
                            nexthdr_off,
                        });
                    }
                }
                _ => {
                    return Ok(FragOpt {
                        offset,
                        nexthdr_off,
                    })
                }
            }

            let exthdr = match Ipv6OptHeader::new(&nh[offset..]) {
                Ok(exthdr) => exthdr,
                Err(rest) if rest.is_empty() => {
                    debug!("extension header chain ends at tail, offset {}", offset);
                    return Err(Error::NoInsertionPoint { offset });
                }
                Err(_) => {
                    debug!("truncated extension header at offset {}", offset);
                    return Err(Error::MalformedChain { offset });
                }
            };
            let len = exthdr.header_len();
            if offset + len >= IPV6_MAXPLEN {
                debug!("extension header at offset {} exceeds max payload", offset);
                return Err(Error::MalformedChain { offset });
            }
            nexthdr_off = offset;
            offset += len;
        }

        debug!(
            "extension header at offset {} runs past tail {}",
            nexthdr_off, packet_len
        );
        Err(Error::MalformedChain {
            offset: nexthdr_off,
        })
    }
}
