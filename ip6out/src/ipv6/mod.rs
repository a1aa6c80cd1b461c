//! IPv6 wire formats touched on the send path.

mod header;
pub use header::{Ipv6Header, IPV6_HEADER_LEN, IPV6_MAXPLEN, NEXTHDR_OFFSET, SADDR_OFFSET};

mod frag;
pub use frag::{FragHeader, FRAG_HEADER_LEN};

mod option;
pub use option::{find_tlv, Ipv6OptHeader, TlvOption, TlvOptionIter, IPV6_TLV_HAO};

mod fragopt;
pub use fragopt::{FragOpt, FragOptFinder};

enum_sim! {
    /// An enum-like type for representing the next header values of IPv6.
    pub struct IpProtocol (u8) {
        /// Hop-by-hop options header.
        HOPOPT = 0,

        /// TCP.
        TCP = 6,

        /// UDP.
        UDP = 17,

        /// Routing header.
        IPV6_ROUTE = 43,

        /// Fragment header.
        IPV6_FRAG = 44,

        /// Encapsulating security payload.
        ESP = 50,

        /// Authentication header.
        AH = 51,

        /// ICMPv6.
        ICMPV6 = 58,

        /// No next header.
        IPV6_NO_NXT = 59,

        /// Destination options header.
        IPV6_OPTS = 60,

        /// Mobility header.
        MH = 135,
    }
}
